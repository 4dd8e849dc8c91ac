mod common;

use std::error::Error;
use std::fs;

use audioprep_core::{plan_renames, standardize_filenames, PrepError, StandardizeConfig};
use common::{file_names, touch_all};
use tempfile::tempdir;

#[test]
fn renames_files_in_sorted_order_and_skips_hidden() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let class_dir = root.path().join("siren");
    touch_all(&class_dir, &["b.wav", "a.wav", ".DS_Store", "c.mp3"])?;

    let report = standardize_filenames(&StandardizeConfig::new(root.path()))?;

    assert_eq!(report.directories, 1);
    assert_eq!(report.renames.len(), 3);
    assert_eq!(report.renames[0].from, class_dir.join("a.wav"));
    assert_eq!(report.renames[0].to, class_dir.join("siren_001.wav"));
    assert_eq!(
        file_names(&class_dir)?,
        [".DS_Store", "siren_001.wav", "siren_002.wav", "siren_003.mp3"]
    );
    Ok(())
}

#[test]
fn second_run_performs_no_renames() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    touch_all(&root.path().join("dog_bark"), &["x.wav", "y.wav", "z.wav"])?;
    touch_all(&root.path().join("doorbell"), &["ring.wav"])?;

    let config = StandardizeConfig::new(root.path());
    let first = standardize_filenames(&config)?;
    let second = standardize_filenames(&config)?;

    assert_eq!(first.renames.len(), 4);
    assert!(second.renames.is_empty());
    assert_eq!(
        file_names(&root.path().join("dog_bark"))?,
        ["dog_bark_001.wav", "dog_bark_002.wav", "dog_bark_003.wav"]
    );
    assert_eq!(
        file_names(&root.path().join("doorbell"))?,
        ["doorbell_001.wav"]
    );
    Ok(())
}

#[test]
fn indices_increase_by_one_per_visible_file() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let class_dir = root.path().join("cat");
    let names: Vec<String> = (0..12).map(|n| format!("meow{n:02}.wav")).collect();
    let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
    names.push(".hidden");
    touch_all(&class_dir, &names)?;

    let plan = plan_renames(&class_dir)?;

    let targets: Vec<_> = plan
        .iter()
        .map(|r| r.to.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    let expected: Vec<_> = (1..=12).map(|n| format!("cat_{n:03}.wav")).collect();
    assert_eq!(targets, expected);
    Ok(())
}

#[test]
fn root_files_are_left_alone_and_nested_dirs_are_processed() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    touch_all(root.path(), &["index.csv"])?;
    touch_all(&root.path().join("birds").join("crow"), &["caw.wav"])?;

    let report = standardize_filenames(&StandardizeConfig::new(root.path()))?;

    assert_eq!(report.directories, 2);
    assert!(root.path().join("index.csv").exists());
    assert_eq!(
        file_names(&root.path().join("birds").join("crow"))?,
        ["crow_001.wav"]
    );
    // Subdirectories are not files and keep their names.
    assert_eq!(file_names(&root.path().join("birds"))?, ["crow"]);
    Ok(())
}

#[test]
fn files_without_extension_get_an_empty_one() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    touch_all(&root.path().join("noise"), &["README"])?;

    standardize_filenames(&StandardizeConfig::new(root.path()))?;

    assert_eq!(file_names(&root.path().join("noise"))?, ["noise_001."]);
    Ok(())
}

#[test]
fn collision_with_unrelated_file_fails_before_renaming() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let class_dir = root.path().join("cat");
    touch_all(&class_dir, &["a.wav", "cat_001.wav"])?;

    let err = standardize_filenames(&StandardizeConfig::new(root.path()))
        .expect_err("collision should be reported");

    match err {
        PrepError::RenameCollision { from, to } => {
            assert_eq!(from, class_dir.join("a.wav"));
            assert_eq!(to, class_dir.join("cat_001.wav"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(file_names(&class_dir)?, ["a.wav", "cat_001.wav"]);
    Ok(())
}

#[test]
fn dry_run_leaves_files_untouched() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let class_dir = root.path().join("siren");
    touch_all(&class_dir, &["one.wav", "two.wav"])?;

    let config = StandardizeConfig::new(root.path()).dry_run(true);
    let report = standardize_filenames(&config)?;

    assert_eq!(report.renames.len(), 2);
    assert_eq!(file_names(&class_dir)?, ["one.wav", "two.wav"]);
    Ok(())
}

#[test]
fn missing_root_is_reported() -> Result<(), Box<dyn Error>> {
    let root = tempdir()?;
    let missing = root.path().join("nope");

    let err = standardize_filenames(&StandardizeConfig::new(&missing)).unwrap_err();
    assert!(matches!(err, PrepError::MissingDirectory(path) if path == missing));

    fs::create_dir(&missing)?;
    assert_eq!(
        standardize_filenames(&StandardizeConfig::new(&missing))?.directories,
        0
    );
    Ok(())
}
