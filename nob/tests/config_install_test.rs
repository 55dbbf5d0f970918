//! Installing the Coordinator from a configuration file
//!
//! Own test binary so the install here is the first one in the process.

use std::io::Write;

use node_observer::logging::setup_logging;
use node_observer::{Config, Coordinator, RecordingNotifier, SubjectRef};
use tempfile::NamedTempFile;

#[test]
fn test_install_from_loaded_config() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(
        file,
        "log-level: debug\ncoordinator:\n  initial-capacity: 12\n  warn-on-duplicate-register: true"
    )
    .unwrap();

    let config = Config::load(Some(&file.path().to_path_buf())).expect("config loads");
    setup_logging(None, config.log_level()).expect("logging initializes");

    let recorder = RecordingNotifier::new();
    let coordinator = Coordinator::install_from(&config, recorder.clone()).expect("first install succeeds");

    assert_eq!(coordinator.config(), &config.coordinator);
    assert!(std::ptr::eq(Coordinator::instance(), coordinator));

    let subject = SubjectRef::new();
    coordinator.register(&subject).unwrap();
    coordinator.register(&subject).unwrap();
    coordinator.report_change(&subject).unwrap();

    assert_eq!(recorder.updates(), vec![subject]);
    assert_eq!(coordinator.metrics().duplicate_registrations, 1);

    let err = Coordinator::install_from(&config, RecordingNotifier::new()).unwrap_err();
    assert!(err.is_access_violation());
}
