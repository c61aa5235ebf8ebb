use msds::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

const USAGE: &str = "\
commands:
  login <email> [name] [role]   sign in (role: user | admin | engineer)
  engineer <email> <password>   engineer sign-in
  logout                        sign out
  goto <path>                   navigate
  whoami                        show the signed-in user
  help                          this text
  quit                          exit";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Login { email: String, name: String, role: Option<Role> },
    Engineer { email: String, password: String },
    Logout,
    Goto(String),
    Whoami,
    Help,
    Quit,
}

/// Parses one input line. Blank lines parse to `None`.
fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let cmd = match (verb, args.as_slice()) {
        ("login", [email]) => Command::Login {
            email: email.to_string(),
            name: email.to_string(),
            role: None,
        },
        ("login", [email, name]) => Command::Login {
            email: email.to_string(),
            name: name.to_string(),
            role: None,
        },
        ("login", [email, name, role]) => Command::Login {
            email: email.to_string(),
            name: name.to_string(),
            role: Some(role.parse().map_err(|e: ProtocolError| e.to_string())?),
        },
        ("engineer", [email, password]) => Command::Engineer {
            email: email.to_string(),
            password: password.to_string(),
        },
        ("logout", []) => Command::Logout,
        ("goto", [path]) => Command::Goto(path.to_string()),
        ("whoami", []) => Command::Whoami,
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(format!("unrecognized command `{}`; try `help`", line.trim())),
    };
    Ok(Some(cmd))
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Runs a command and returns the lines to print.
async fn execute<S, A>(
    dashboard: &mut Dashboard<S, A>,
    cmd: Command,
) -> Result<Vec<String>, MsdsError>
where
    S: DurableSlot,
    A: Authenticator,
{
    let mut out = Vec::new();
    match cmd {
        Command::Login { email, name, role } => {
            let mut candidate = SessionCandidate::new(email, name);
            candidate.role = role;
            let session = dashboard.login(candidate).await?;
            out.push(format!("signed in as {session}"));
        }
        Command::Engineer { email, password } => {
            let session = dashboard
                .login_as_engineer(Credentials::new(email, password))
                .await?;
            let staff_id = session.staff_id.as_deref().unwrap_or("-");
            out.push(format!("signed in as {session}, staff id {staff_id}"));
        }
        Command::Logout => {
            dashboard.logout().await?;
            out.push("signed out".to_string());
        }
        Command::Goto(path) => dashboard.navigate(&path),
        Command::Whoami => {
            let ctx = dashboard.context()?;
            out.push(match ctx.user {
                Some(user) => user.to_string(),
                None => "(signed out)".to_string(),
            });
            return Ok(out);
        }
        Command::Help => return Ok(vec![USAGE.to_string()]),
        Command::Quit => return Ok(out),
    }

    let decisions = dashboard.settle().await;
    let page = format!("[page] {}", dashboard.history().current_path());
    if decisions.is_empty() {
        // Nothing moved; report the page that is already showing.
        if dashboard.decision().is_some_and(GuardDecision::renders) {
            out.push(page);
        }
        return Ok(out);
    }
    for decision in decisions {
        out.push(match decision {
            GuardDecision::Render => page.clone(),
            other => format!("guard: {other}"),
        });
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let data_dir =
        std::env::var("MSDS_DATA_DIR").unwrap_or_else(|_| ".msds".to_string());
    eprintln!("MSDS console, session stored in {data_dir}");

    let mut dashboard = DashboardBuilder::new()
        .build(FileSlot::new(&data_dir), PlaceholderAuthenticator)
        .await?;
    println!("[page] {}", dashboard.history().current_path());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match parse_command(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        match execute(&mut dashboard, cmd).await {
            Ok(out) => out.iter().for_each(|line| println!("{line}")),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    dashboard.shutdown().await;
    Ok(())
}
