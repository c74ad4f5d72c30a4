//! Sessions built from configuration

use crate::{ErrorKind, LoopConfig, Mode, Session, SlotId, StoreConfig, state_file_path};

use super::test_utils::*;

const STATE_LEN: usize = 4096;

fn config_in(dir: &std::path::Path, slot_count: usize, default_slot: u32) -> LoopConfig {
    let mut config = LoopConfig {
        store: StoreConfig {
            slot_count,
            directory: dir.join("loops"),
        },
        ..Default::default()
    };
    config.session.default_slot = default_slot;
    config
}

#[test]
fn test_session_from_config_uses_configured_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), 3, 2);

    let mut session = Session::<PadInput>::from_config(&config, STATE_LEN).unwrap();
    assert_eq!(session.store().slot_count(), 3);
    assert_eq!(session.store().valid_count(), 3);
    assert_eq!(session.default_slot(), SlotId(2));
    assert!(state_file_path(&dir.path().join("loops"), SlotId(2)).exists());

    let mut host = TestHost::new(STATE_LEN, 1);
    assert_eq!(session.toggle(&mut host.state).unwrap(), Mode::Recording(SlotId(2)));
}

#[test]
fn test_config_file_drives_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("relive.toml");
    config_in(dir.path(), 2, 1).save(&path).unwrap();

    let config = LoopConfig::load(&path).unwrap();
    let session = Session::<PadInput>::from_config(&config, STATE_LEN).unwrap();
    assert_eq!(session.default_slot(), SlotId(1));
    assert_eq!(session.store().directory(), dir.path().join("loops"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let err = Session::<PadInput>::from_config(&config_in(dir.path(), 2, 5), STATE_LEN)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = Session::<PadInput>::from_config(&config_in(dir.path(), 0, 0), STATE_LEN)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    // Nothing was created for a rejected config
    assert!(!dir.path().join("loops").exists());
}
