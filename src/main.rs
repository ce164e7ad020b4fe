use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::error;

mod app;
mod args;
mod backend;
mod credentials;
mod session;
mod user;

use app::{App, View};
use args::{Args, Command, Form};
use backend::Backend;
use credentials::Credentials;
use session::Session;

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init_custom_env("SIGNON_LOG");

    let args = Args::parse();

    let backend = match Backend::new(args.data_dir()).await {
        Ok(b) => Arc::new(b),
        Err(()) => {
            eprintln!("Error: couldn't open {}", args.data_dir().display());
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(
        Credentials::new(Arc::clone(&backend)),
        Session::new(backend),
    );
    app.start().await;

    match args.command() {
        Command::SignUp(form) => {
            app.toggle_mode();
            submit(&mut app, form).await
        }
        Command::SignIn(form) => submit(&mut app, form).await,
        Command::SignOut => match app.logout().await {
            Ok(()) => {
                println!("Signed out");
                ExitCode::SUCCESS
            }
            Err(()) => {
                eprintln!("Error: {}", app::UNEXPECTED);
                ExitCode::FAILURE
            }
        },
        Command::Status => {
            match app.view() {
                View::LoggedIn { .. } => println!("Signed in"),
                View::Form => println!("Signed out"),
            }
            ExitCode::SUCCESS
        }
    }
}

async fn submit(app: &mut App, form: &Form) -> ExitCode {
    let mode = app.mode();
    println!("{}\n{}", mode.title(), mode.subtitle());
    println!("[{}]", mode.submit_label());

    let password = match &form.password {
        Some(p) => p.clone(),
        None => match rpassword::prompt_password("Password: ") {
            Ok(p) => p,
            Err(e) => {
                error!("couldn't read password: {e:?}");
                eprintln!("Error: couldn't read password");
                return ExitCode::FAILURE;
            }
        },
    };

    let alert = app.submit(&form.username, &password).await;
    if alert.is_error() {
        eprintln!("{alert}");
        if let Some(hint) = app.switch_hint(&alert) {
            eprintln!("{hint}");
        }
        return ExitCode::FAILURE;
    }

    println!("{alert}");
    if let Some(greeting) = app.greeting() {
        println!("{greeting}");
    }
    ExitCode::SUCCESS
}
