use std::error::Error;
use std::fs::File;
use std::path::Path;

use log::{error, info};
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use time::OffsetDateTime;

use uni_registrar::registrar::catalog::{Faculty, Semester};
use uni_registrar::registrar::config::Settings;
use uni_registrar::registrar::notify::LogNotifier;
use uni_registrar::registrar::person::StudentRole;
use uni_registrar::registrar::registration::RequestKind;
use uni_registrar::registrar::store::SnapshotStore;
use uni_registrar::AppState;

const USAGE: &str = "usage: uni-registrar <command>

commands:
  summary                   print the calendar, policy and counts
  import-courses <csv>      add courses to the catalog
  import-lessons <csv>      attach lessons to catalog courses
  open-registration         open the registration window
  close-registration        close the registration window
  next-semester             close the running semester for every student
  add-student <login> <faculty> [year-of-study]
                            register a student and print the new id
  submit <student-id> <course> <add|drop>
                            file a registration request
  decide <request-id>       review a pending registration request
  reject <request-id>       refuse a pending registration request
  transcript <student-id>   print a student's transcript";

fn init_logger(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        settings.log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &settings.log_file {
        loggers.push(WriteLogger::new(settings.log_level, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

/// 首次运行时按当前日期创建状态: 9 月之后为秋季学期
fn fresh_state(settings: &Settings) -> AppState {
    let now = OffsetDateTime::now_utc();
    let semester = if u8::from(now.month()) >= 9 {
        Semester::Fall
    } else {
        Semester::Spring
    };
    let year = match semester {
        Semester::Fall => now.year(),
        Semester::Spring => now.year() - 1,
    };
    let mut state = AppState::new(year, semester);
    state.set_max_credits(settings.max_credits);
    state
}

fn summary(state: &AppState) {
    let calendar = state.calendar();
    let policy = state.policy();
    println!("{} {}", calendar.semester, calendar.year);
    println!(
        "registration {}, scheduling {}, max credits {}",
        if policy.registration_open { "open" } else { "closed" },
        if policy.scheduling_open { "open" } else { "closed" },
        policy.max_credits
    );
    println!("courses: {}", state.catalog().len());
    println!("people: {}", state.people().count());
    println!("pending requests: {}", state.pending_requests().len());
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    init_logger(&settings)?;

    let store = SnapshotStore::new(&settings.data_file);
    let mut state = match store.load()? {
        Some(state) => state,
        None => {
            info!("no data at {}, starting fresh", store.path().display());
            fresh_state(&settings)
        }
    };

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["summary"] => {
            summary(&state);
            return Ok(());
        }
        ["transcript", id] => {
            println!("{}", state.transcript(id)?);
            return Ok(());
        }
        ["import-courses", path] => {
            let added = state.import_courses(Path::new(path))?;
            println!("{} courses added", added);
        }
        ["import-lessons", path] => {
            let added = state.import_lessons(Path::new(path))?;
            println!("{} lessons added", added);
        }
        ["open-registration"] => state.open_registration(),
        ["close-registration"] => state.close_registration(),
        ["add-student", login, faculty, rest @ ..] => {
            let year_of_study = match rest {
                [] => 1,
                [year] => year.parse()?,
                _ => return Err("add-student takes at most one year of study".into()),
            };
            let id = state.add_student(login, StudentRole::new(Faculty::new(*faculty), year_of_study));
            println!("{}", id);
        }
        ["submit", student, course, kind] => {
            let request = state.submit_registration(student, course, kind.parse::<RequestKind>()?)?;
            println!("request {} submitted", request.id());
        }
        ["decide", id] => {
            let decision = state.decide(id.parse()?, &mut LogNotifier)?;
            println!("request {}: {:?}", id, decision);
        }
        ["reject", id] => {
            state.reject(id.parse()?, &mut LogNotifier)?;
            println!("request {} refused", id);
        }
        ["next-semester"] => {
            state.next_semester();
            let calendar = state.calendar();
            println!("now {} {}", calendar.semester, calendar.year);
        }
        _ => {
            eprintln!("{}", USAGE);
            return Err("unknown command".into());
        }
    }

    store.save(&state)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
