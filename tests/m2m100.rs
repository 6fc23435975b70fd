use indicatif::ProgressBar;
use m2m_translate::model::M2M100Translator;
use m2m_translate::pipeline::TranslationJob;
use m2m_translate::reader::SentenceBatch;
use m2m_translate::{translate_file, TranslateConfig, TranslationBackend};
use std::fs;
use tempfile::tempdir;

const MODEL_NAME: &str = "facebook/m2m100_418M";

fn small_model_config(source_lang: &str, target_lang: &str) -> TranslateConfig {
    let mut config = TranslateConfig::new("unused.txt", "unused.txt", source_lang, target_lang);
    config.model_name = MODEL_NAME.to_string();
    config
}

#[test]
#[cfg_attr(not(feature = "all-tests"), ignore)]
fn m2m100_translation() -> anyhow::Result<()> {
    let config = small_model_config("en", "es");
    let translator = M2M100Translator::new(&config.model_name, &config.validate()?, 128)?;

    let tokenized = translator.tokenize(&["The dog did not wake up.".to_string()])?;
    assert_eq!(tokenized.batch_size, 1);
    // language token, sentence tokens and end of sequence
    assert!(tokenized.sequence_length > 3);

    let output = translator.translate_batch(&SentenceBatch {
        index: 0,
        sentences: vec!["The dog did not wake up.".to_string()],
    })?;

    assert_eq!(output.len(), 1);
    assert!(output[0].to_lowercase().contains("perro"));
    Ok(())
}

#[test]
#[cfg_attr(not(feature = "all-tests"), ignore)]
fn m2m100_batch_keeps_order() -> anyhow::Result<()> {
    let config = small_model_config("en", "fr");
    let translator = M2M100Translator::new(&config.model_name, &config.validate()?, 128)?;

    let root = tempdir()?;
    let input = root.path().join("sentences.txt");
    let output = root.path().join("translations").join("fr.txt");
    fs::write(
        &input,
        "This sentence will be translated in multiple languages.\n\
         The weather is nice today.\n\
         \n\
         I would like a cup of coffee, please.\n",
    )?;

    let mut run_config = config.clone();
    run_config.sentences_path = input;
    run_config.output_path = output.clone();
    run_config.batch_size = 2;
    let summary = TranslationJob::prepare(&run_config)?.run(&translator, &ProgressBar::hidden())?;

    assert_eq!(summary.lines_written, 3);
    let translations = fs::read_to_string(&output)?;
    let lines = translations.lines().collect::<Vec<&str>>();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|line| !line.is_empty()));
    assert!(lines[2].to_lowercase().contains("café"));
    Ok(())
}

#[test]
#[cfg_attr(not(feature = "all-tests"), ignore)]
fn m2m100_translate_file_is_deterministic() -> anyhow::Result<()> {
    let root = tempdir()?;
    let input = root.path().join("sentences.txt");
    fs::write(&input, "Hello my name is John.\nHow are you?\n")?;

    let mut config = small_model_config("en", "de");
    config.sentences_path = input;
    config.output_path = root.path().join("out").join("de.txt");

    translate_file(&config)?;
    let first = fs::read_to_string(&config.output_path)?;
    translate_file(&config)?;
    let second = fs::read_to_string(&config.output_path)?;

    assert_eq!(first, second);
    assert_eq!(second.lines().count(), 2);
    Ok(())
}
