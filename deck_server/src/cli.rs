use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets are deliberately absent from this list
    const DISPLAY_ENVS: [&str; 10] = [
        "RUST_LOG",
        "DECK_HOST",
        "DECK_PORT",
        "DECK_DATABASE_URL",
        "DECK_DATABASE_MAX_CONNECTIONS",
        "DECK_MIDTRANS_PRODUCTION",
        "DECK_MIDTRANS_TIMEOUT_SECS",
        "DECK_MIDTRANS_ENABLED_PAYMENTS",
        "DECK_PAYMENT_EXPIRY_MINUTES",
        "DECK_EVENT_BUFFER_SIZE",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
