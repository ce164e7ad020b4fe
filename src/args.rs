use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(about = "Local username/password accounts with a persisted login session")]
pub struct Args {
    /// Where accounts and the session flag are stored.
    /// Created if it doesn't exist.
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an account
    SignUp(Form),

    /// Check credentials and start a session
    SignIn(Form),

    /// End the current session
    SignOut,

    /// Show whether a session is active
    Status,
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub username: String,

    /// Read from the terminal, without echo, if not given.
    #[arg(short, long)]
    pub password: Option<String>,
}

impl Args {
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_sign_in() {
        let args = Args::try_parse_from(["signon", "-d", "/tmp/x", "sign-in", "alice", "-p", "pw"])
            .unwrap();

        assert_eq!(args.data_dir(), &PathBuf::from("/tmp/x"));
        assert_eq!(
            args.command(),
            &Command::SignIn(Form {
                username: "alice".into(),
                password: Some("pw".into()),
            })
        );
    }

    #[test]
    fn password_is_optional() {
        let args = Args::try_parse_from(["signon", "sign-up", "bob"]).unwrap();

        assert_eq!(args.data_dir(), &PathBuf::from("."));
        assert!(matches!(
            args.command(),
            Command::SignUp(Form { password: None, .. })
        ));
    }

    #[test]
    fn requires_a_command() {
        assert!(Args::try_parse_from(["signon"]).is_err());
        assert!(Args::try_parse_from(["signon", "sign-in"]).is_err());
    }
}
