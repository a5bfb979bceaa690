use std::sync::Arc;

use tracing::{debug, info};

use shared_database::Database;
use shared_models::AppError;
use shared_utils::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddDoctor,
    AddPatient,
    AddAppointment,
    MakeAppointment,
    ListAppointmentsOfDoctor,
    ListAvailableAppointmentsOfDepartment,
    ListStatusCountsPerDoctor,
    FindPatientCountByStatus,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 9] = [
        MenuChoice::AddDoctor,
        MenuChoice::AddPatient,
        MenuChoice::AddAppointment,
        MenuChoice::MakeAppointment,
        MenuChoice::ListAppointmentsOfDoctor,
        MenuChoice::ListAvailableAppointmentsOfDepartment,
        MenuChoice::ListStatusCountsPerDoctor,
        MenuChoice::FindPatientCountByStatus,
        MenuChoice::Exit,
    ];

    /// Accepts 1 to 9; anything else is not a choice.
    pub fn parse(input: &str) -> Option<Self> {
        let number = input.trim().parse::<usize>().ok()?;
        number
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index))
            .copied()
    }

    pub fn caption(&self) -> &'static str {
        match self {
            MenuChoice::AddDoctor => "1. Add Doctor",
            MenuChoice::AddPatient => "2. Add Patient",
            MenuChoice::AddAppointment => "3. Add Appointment",
            MenuChoice::MakeAppointment => "4. Make an Appointment",
            MenuChoice::ListAppointmentsOfDoctor => "5. List appointments of a given doctor",
            MenuChoice::ListAvailableAppointmentsOfDepartment => {
                "6. List all available appointments of a given department"
            }
            MenuChoice::ListStatusCountsPerDoctor => {
                "7. List total number of different types of appointments per doctor in descending order"
            }
            MenuChoice::FindPatientCountByStatus => {
                "8. Find total number of patients per doctor with a given status"
            }
            MenuChoice::Exit => "9. < EXIT",
        }
    }
}

fn print_menu(console: &mut Console) -> Result<(), AppError> {
    console.println("MAIN MENU")?;
    console.println("---------")?;
    for choice in MenuChoice::ALL {
        console.println(choice.caption())?;
    }
    Ok(())
}

/// Re-asks until a menu number is entered.
fn read_choice(console: &mut Console) -> Result<MenuChoice, AppError> {
    loop {
        let choice = match console.read_line("Please make your choice: ") {
            Ok(line) => MenuChoice::parse(&line),
            Err(AppError::Parse(_)) => None,
            Err(err) => return Err(err),
        };
        match choice {
            Some(choice) => return Ok(choice),
            None => console.println("Your input is invalid!")?,
        }
    }
}

async fn dispatch(
    choice: MenuChoice,
    db: Arc<dyn Database>,
    console: &mut Console,
) -> Result<(), AppError> {
    match choice {
        MenuChoice::AddDoctor => doctor_cell::handlers::add_doctor(db, console).await,
        MenuChoice::AddPatient => patient_cell::handlers::add_patient(db, console).await,
        MenuChoice::AddAppointment => appointment_cell::handlers::add_appointment(db, console).await,
        MenuChoice::MakeAppointment => appointment_cell::handlers::make_appointment(db, console).await,
        MenuChoice::ListAppointmentsOfDoctor => {
            report_cell::handlers::list_appointments_of_doctor(db, console).await
        }
        MenuChoice::ListAvailableAppointmentsOfDepartment => {
            report_cell::handlers::list_available_appointments_of_department(db, console).await
        }
        MenuChoice::ListStatusCountsPerDoctor => {
            report_cell::handlers::list_status_counts_per_doctor(db, console).await
        }
        MenuChoice::FindPatientCountByStatus => {
            report_cell::handlers::find_patient_count_by_status(db, console).await
        }
        MenuChoice::Exit => Ok(()),
    }
}

/// Runs the main menu until Exit or until the console input closes.
/// Operation failures are reported and the menu comes back.
pub async fn run_menu(db: Arc<dyn Database>, console: &mut Console) -> Result<(), AppError> {
    loop {
        print_menu(console)?;

        let choice = match read_choice(console) {
            Ok(choice) => choice,
            Err(AppError::Cancelled) => {
                debug!("Console closed at the main menu");
                break;
            }
            Err(err) => return Err(err),
        };

        if choice == MenuChoice::Exit {
            break;
        }

        debug!("Menu choice {:?}", choice);
        match dispatch(choice, Arc::clone(&db), console).await {
            Ok(()) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => console.println(&err.console_message())?,
        }
    }

    info!("Leaving main menu");
    Ok(())
}
