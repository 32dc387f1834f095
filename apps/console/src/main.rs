use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use client_core::{calendar, dashboard, ClinicClient, SyncError};
use shared::{
    domain::{
        AppointmentId, AppointmentStatus, LeadId, LeadStatus, PatientId, ServiceType,
    },
    protocol::{AppointmentDraft, LeadDraft, LeadPatch, PatientDraft},
};
use tracing::warn;

mod config;
mod views;

#[derive(Parser, Debug)]
#[command(name = "clinic", about = "Console front end for the clinic CRM backend")]
struct Args {
    /// Overrides the configured server URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Appointments {
        #[command(subcommand)]
        action: AppointmentAction,
    },
    Leads {
        #[command(subcommand)]
        action: LeadAction,
    },
    Patients {
        #[command(subcommand)]
        action: PatientAction,
    },
    /// Calendar feed starting at a day.
    Calendar {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    Dashboard,
}

#[derive(Subcommand, Debug)]
enum AppointmentAction {
    List,
    Add {
        #[arg(long)]
        patient_id: i64,
        /// RFC 3339, e.g. 2024-05-10T15:30:00Z
        #[arg(long)]
        date: DateTime<Utc>,
        #[arg(long)]
        service: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        duration: Option<u32>,
    },
    Cancel {
        #[arg(long)]
        id: i64,
    },
    Remove {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum LeadAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Moves a lead to another kanban column.
    Move {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        status: String,
    },
    Note {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        notes: String,
    },
    Remove {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum PatientAction {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

fn parse_service(raw: &str) -> Result<ServiceType> {
    match raw.to_ascii_lowercase().as_str() {
        "consulta" => Ok(ServiceType::Consulta),
        "limpieza" => Ok(ServiceType::Limpieza),
        "tratamiento" => Ok(ServiceType::Tratamiento),
        other => Err(anyhow!(
            "unknown service '{other}' (consulta, limpieza, tratamiento)"
        )),
    }
}

fn parse_lead_status(raw: &str) -> Result<LeadStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "nuevo" => Ok(LeadStatus::Nuevo),
        "contactado" => Ok(LeadStatus::Contactado),
        "interesado" => Ok(LeadStatus::Interesado),
        "convertido" => Ok(LeadStatus::Convertido),
        "perdido" => Ok(LeadStatus::Perdido),
        other => Err(anyhow!(
            "unknown lead status '{other}' (nuevo, contactado, interesado, convertido, perdido)"
        )),
    }
}

/// The `detail` text a server rejection carries is what the user sees.
fn surface(err: SyncError) -> anyhow::Error {
    anyhow!(err.user_message())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut settings = config::load_settings();
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(email) = args.email {
        settings.email = Some(email);
    }
    if let Some(password) = args.password {
        settings.password = Some(password);
    }

    url::Url::parse(&settings.server_url)
        .with_context(|| format!("invalid server url: {}", settings.server_url))?;

    let client = ClinicClient::new(settings.server_url.clone())?;

    let email = settings
        .email
        .ok_or_else(|| anyhow!("missing email: set CLINIC_EMAIL, clinic.toml or --email"))?;
    let password = settings
        .password
        .ok_or_else(|| anyhow!("missing password: set CLINIC_PASSWORD, clinic.toml or --password"))?;
    client
        .session
        .login(&email, &password)
        .await
        .map_err(surface)?;

    let outcome = run(&client, args.command).await;

    // Let the watching views drain their event queues before teardown.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    client.detach_all().await;
    if let Err(err) = client.session.logout().await {
        warn!("logout failed: {err}");
    }

    outcome
}

async fn run(client: &ClinicClient, command: Command) -> Result<()> {
    match command {
        Command::Appointments { action } => {
            let _view = views::watch(&client.appointments, "citas");
            match action {
                AppointmentAction::List => {
                    let records = client.appointments.load().await.map_err(surface)?;
                    views::print_appointments(&records);
                }
                AppointmentAction::Add {
                    patient_id,
                    date,
                    service,
                    notes,
                    duration,
                } => {
                    let draft = AppointmentDraft {
                        patient_id: PatientId(patient_id),
                        date,
                        service_type: parse_service(&service)?,
                        notes,
                        duration,
                    };
                    let created = client.appointments.create(&draft).await.map_err(surface)?;
                    println!("Cita creada: #{}", created.id);
                }
                AppointmentAction::Cancel { id } => {
                    let updated = client
                        .appointments
                        .change_status(AppointmentId(id), AppointmentStatus::Cancelled)
                        .await
                        .map_err(surface)?;
                    println!("Cita #{} ahora {}", updated.id, updated.status);
                }
                AppointmentAction::Remove { id } => {
                    client
                        .appointments
                        .remove(AppointmentId(id))
                        .await
                        .map_err(surface)?;
                    println!("Cita #{id} eliminada");
                }
            }
        }
        Command::Leads { action } => {
            let _view = views::watch(&client.leads, "leads");
            match action {
                LeadAction::List => {
                    let records = client.leads.load().await.map_err(surface)?;
                    views::print_leads(&records);
                }
                LeadAction::Add {
                    name,
                    email,
                    phone,
                    source,
                    notes,
                } => {
                    let draft = LeadDraft {
                        name,
                        email,
                        phone,
                        status: None,
                        source,
                        notes,
                    };
                    let created = client.leads.create(&draft).await.map_err(surface)?;
                    println!("Lead creado: #{}", created.id);
                }
                LeadAction::Move { id, status } => {
                    let status = parse_lead_status(&status)?;
                    let updated = client
                        .leads
                        .change_status(LeadId(id), status)
                        .await
                        .map_err(surface)?;
                    println!("Lead #{} ahora {}", updated.id, updated.status);
                }
                LeadAction::Note { id, notes } => {
                    let patch = LeadPatch {
                        notes: Some(notes),
                        ..LeadPatch::default()
                    };
                    let updated = client
                        .leads
                        .update(LeadId(id), &patch)
                        .await
                        .map_err(surface)?;
                    println!("Lead #{} actualizado", updated.id);
                }
                LeadAction::Remove { id } => {
                    client.leads.remove(LeadId(id)).await.map_err(surface)?;
                    println!("Lead #{id} eliminado");
                }
            }
        }
        Command::Patients { action } => {
            let _view = views::watch(&client.patients, "pacientes");
            match action {
                PatientAction::List => {
                    let records = client.patients.load().await.map_err(surface)?;
                    views::print_patients(&records);
                }
                PatientAction::Add {
                    name,
                    email,
                    phone,
                    address,
                } => {
                    let draft = PatientDraft {
                        name,
                        email,
                        phone,
                        address,
                    };
                    let created = client.patients.create(&draft).await.map_err(surface)?;
                    println!("Paciente creado: #{}", created.id);
                }
            }
        }
        Command::Calendar { from, days } => {
            let appointments = client.appointments.load().await.map_err(surface)?;
            let patients = client.patients.load().await.map_err(surface)?;
            let directory = calendar::patient_directory(&patients);
            let window = calendar::DateWindow::spanning_days(from, days);
            let events = calendar::events_in_window(&appointments, &directory, window);
            views::print_calendar(&events);
        }
        Command::Dashboard => {
            let appointments = client.appointments.load().await.map_err(surface)?;
            let leads = client.leads.load().await.map_err(surface)?;
            let patients = client.patients.load().await.map_err(surface)?;
            let summary = dashboard::summarize(
                &appointments,
                &leads,
                &patients,
                Utc::now().date_naive(),
            );
            views::print_summary(&summary);
        }
    }
    Ok(())
}
