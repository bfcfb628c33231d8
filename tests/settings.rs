use anyhow::Result;
use tempfile::TempDir;

use jdspfx::settings::Settings;
use jdspfx::params::PARAM_COUNT;
use jdspfx::{Command, Jdspfx, ParamId, ParamValue, PassthroughEngine, Payload, PropertyValue};

#[test]
fn settings_round_trip_through_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("settings.json");

    let fx = Jdspfx::new(PassthroughEngine::new());
    fx.set_property("bass-enable", true)?;
    fx.set_property("bass-freq", 80)?;
    fx.set_property("tone-eq", "100;0;0;0;0;0;0;0;0;0;0;0;0;0;-100")?;

    let mut settings = Settings::from_parameters(&fx.parameters());
    settings.block_frames = 256;
    settings.save_to(&path)?;

    let loaded = Settings::load_from(&path)?;
    assert_eq!(loaded, settings);

    let restored = Jdspfx::new(PassthroughEngine::new());
    assert_eq!(loaded.apply(&restored), 0);
    assert_eq!(restored.parameters(), fx.parameters());
    assert_eq!(restored.get(ParamId::BassFreq), ParamValue::Int(80));
    Ok(())
}

#[test]
fn apply_skips_rejected_entries() -> Result<()> {
    let mut settings = Settings::default();
    settings
        .properties
        .insert("bass-freq".into(), PropertyValue::Int(9000));
    settings
        .properties
        .insert("volume".into(), PropertyValue::Int(3));
    settings
        .properties
        .insert("tone-eq".into(), PropertyValue::Str("1;2;3".into()));
    settings
        .properties
        .insert("headset-enable".into(), PropertyValue::Bool(true));

    let fx = Jdspfx::new(PassthroughEngine::new());
    assert_eq!(settings.apply(&fx), 3);

    assert_eq!(fx.get(ParamId::ReverbEnable), ParamValue::Bool(true));
    assert_eq!(fx.get(ParamId::BassFreq), ParamValue::Int(55));
    assert_eq!(fx.bus().try_iter().count(), 3);
    Ok(())
}

#[test]
fn unreadable_file_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ not json")?;

    assert!(Settings::load_from(&path).is_err());
    assert!(Settings::load_from(&dir.path().join("missing.json")).is_err());
    Ok(())
}

#[test]
fn engine_commands_follow_the_session() -> Result<()> {
    let mut settings = Settings {
        sample_rate: 44100,
        ..Settings::default()
    };
    settings
        .properties
        .insert("bass-freq".into(), PropertyValue::Int(80));

    let commands = settings.engine_commands(None)?;
    assert_eq!(commands.len(), 2 + PARAM_COUNT);
    assert_eq!(commands[0], Command::Init);
    assert_eq!(commands[1], Command::SetConfig { sample_rate: 44100 });
    assert_eq!(commands[2], Command::Enable);
    assert!(commands.contains(&Command::SetParam {
        opcode: 114,
        payload: Payload::Int16(80)
    }));

    let commands = settings.engine_commands(Some(96000))?;
    assert_eq!(commands[1], Command::SetConfig { sample_rate: 96000 });

    assert!(settings.engine_commands(Some(0)).is_err());
    Ok(())
}
