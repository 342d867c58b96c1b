//! Interactive terminal shell over the Vitalink client core.
//!
//! Resolves the persisted session, then walks the route table the way
//! the web shell does: login/register when unauthenticated, otherwise
//! the dashboard matching the resolved role.

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use vitalink::api::ApiClient;
use vitalink::auth::{resolve_session, LoginForm, RegisterForm};
use vitalink::config;
use vitalink::dashboard::{DoctorDashboard, PatientDashboard};
use vitalink::models::Role;
use vitalink::routing::{self, Resolution, Route, SessionStatus, View};

fn prompt(label: &str) -> String {
    print!("{label}: ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
    line.trim().to_string()
}

fn show_alerts(alert: Option<vitalink::dashboard::Alert>) {
    if let Some(alert) = alert {
        if alert.is_error() {
            println!("!! {}", alert.text());
        } else {
            println!("-- {}", alert.text());
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let client = ApiClient::from_config();

    println!("Loading...");
    let mut role = resolve_session(&client).await;
    let mut route = Route::Home;

    loop {
        let status = SessionStatus::Resolved(role);
        route = match routing::resolve(route, status, client.session()) {
            Resolution::Placeholder => {
                // The CLI resolves before routing, so this only shows
                // if a future shell routes mid-resolution.
                println!("Loading...");
                Route::Home
            }
            Resolution::Redirect(next) => {
                if route == Route::Logout {
                    role = None;
                }
                next
            }
            Resolution::Render(View::Login) => match run_login(&client).await {
                Some(next) => {
                    // A successful login re-establishes the role for
                    // this session's routing.
                    role = match next {
                        Route::DoctorDashboard => Some(Role::Doctor),
                        Route::PatientDashboard => Some(Role::Patient),
                        _ => None,
                    };
                    next
                }
                None => break,
            },
            Resolution::Render(View::Register) => match run_register(&client).await {
                Some(next) => next,
                None => break,
            },
            Resolution::Render(View::DoctorDashboard) => run_doctor(&client).await,
            Resolution::Render(View::PatientDashboard) => run_patient(&client).await,
            Resolution::Render(View::NotFound) => {
                println!("Not found.");
                Route::Login
            }
        };
    }
}

/// Login view. Returns the next route, or None to quit.
async fn run_login(client: &ApiClient) -> Option<Route> {
    println!("\n== Login == (blank username to register, 'q' to quit)");
    let mut form = LoginForm::new();
    form.username = prompt("Username");
    if form.username == "q" {
        return None;
    }
    if form.username.is_empty() {
        return Some(Route::Register);
    }
    form.password = prompt("Password");

    match form.submit(client).await {
        Ok(next) => Some(next),
        Err(e) => {
            println!("!! {}", e.user_message());
            Some(Route::Login)
        }
    }
}

/// Registration view. Returns the next route, or None to quit.
async fn run_register(client: &ApiClient) -> Option<Route> {
    println!("\n== Register == ('q' to quit)");
    let mut form = RegisterForm::new();
    form.username = prompt("Username");
    if form.username == "q" {
        return None;
    }
    form.password = prompt("Password");
    form.first_name = prompt("First name");
    form.last_name = prompt("Last name");
    form.email = prompt("Email");
    form.user_type = match prompt("User type (1 = doctor, 2 = patient)").parse::<u8>() {
        Ok(v) => Role::from_u8(v),
        Err(_) => None,
    };
    form.address = prompt("Address");

    match form.submit(client).await {
        Ok((next, user)) => {
            println!("-- Registered {}", user.username);
            Some(next)
        }
        Err(e) => {
            println!("!! {}", e.user_message());
            Some(Route::Register)
        }
    }
}

async fn run_doctor(client: &ApiClient) -> Route {
    let mut dashboard = DoctorDashboard::new();
    dashboard.load(client).await;

    loop {
        println!("\n== Doctor Dashboard ==");
        println!("{}", dashboard.render_requests());
        println!("[r]equest access  [v]iew history  [f]refresh  [l]ogout");

        match prompt("> ").as_str() {
            "r" => {
                dashboard.patient_address = prompt("Patient address");
                dashboard.submit_request(client).await;
                show_alerts(dashboard.take_alert());
            }
            "v" => {
                let address = prompt("Patient address");
                dashboard.view_history(client, &address).await;
                println!("{}", dashboard.render_history());
                dashboard.close_modal();
            }
            "f" => dashboard.refresh_requests(client).await,
            "l" => return Route::Logout,
            _ => {}
        }
    }
}

async fn run_patient(client: &ApiClient) -> Route {
    let mut dashboard = PatientDashboard::new();
    dashboard.load(client).await;

    loop {
        println!("\n== Patient Dashboard ==");
        println!("-- History --\n{}", dashboard.render_history());
        println!("-- Access requests --\n{}", dashboard.render_pending());
        println!("-- Previous requests --\n{}", dashboard.render_previous());
        println!("[s]ubmit record  [a]pprove  [r]evoke  [f]refresh  [l]ogout");

        match prompt("> ").as_str() {
            "s" => {
                dashboard.form.age = prompt("Age");
                dashboard.form.height = prompt("Height (in cm)");
                dashboard.form.weight = prompt("Weight (in kg)");
                dashboard.form.systolic = prompt("Systolic blood pressure (in mmHg)");
                dashboard.form.diastolic = prompt("Diastolic blood pressure (in mmHg)");
                dashboard.form.bloodsugar = prompt("Blood sugar level (mg/dL)");
                dashboard.form.symptoms = prompt("Symptoms");
                dashboard.form.diet = prompt("Diet");
                dashboard.submit_record(client).await;
                show_alerts(dashboard.take_alert());
            }
            "a" => {
                let address = prompt("Doctor address");
                dashboard.approve_access(client, &address).await;
                show_alerts(dashboard.take_alert());
            }
            "r" => {
                let address = prompt("Doctor address");
                dashboard.revoke_access(client, &address).await;
                show_alerts(dashboard.take_alert());
            }
            "f" => dashboard.load(client).await,
            "l" => return Route::Logout,
            _ => {}
        }
    }
}
