use std::io::{self, BufRead, Write};
use std::time::Instant;

use norah_speech_lib::diagnostics::run_startup_checks;
use norah_speech_lib::settings::{get_settings, Settings, SettingsError};
use norah_speech_lib::vocabulary::{Language, VisibilityOverrides, Word};
use norah_speech_lib::{AacEngine, AppError, WordHistory};

use crate::commands::{BoardCommand, HELP};

pub fn run() -> Result<(), AppError> {
    let start = Instant::now();

    let settings = match get_settings() {
        Ok(settings) => settings,
        Err(SettingsError::NoConfigDir) => {
            log::warn!("No configuration directory; using default settings");
            Settings::default()
        }
        Err(err) => return Err(err.into()),
    };

    let engine = AacEngine::from_settings(&settings)?;
    run_startup_checks(&engine);

    let batch = engine.preload_board(&settings.preload_languages);
    log::info!(
        "Queued {} audio downloads; board ready in {:?}",
        batch.queued(),
        start.elapsed()
    );

    let mut board = Board::new(engine, settings.language);
    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = board.run(stdin.lock(), stdout.lock()) {
        log::error!("Board shell I/O failed: {e}");
    }

    board.engine.stop();
    log::info!("Board closed");
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

/// Line-oriented board: owns the sentence in progress, the language and the
/// session's word history.
pub struct Board {
    engine: AacEngine,
    available: Vec<Word>,
    sentence: Vec<Word>,
    language: Language,
    history: WordHistory,
}

impl Board {
    pub fn new(engine: AacEngine, language: Language) -> Self {
        let available = engine
            .vocabulary()
            .visible_words(&VisibilityOverrides::new());
        Self {
            engine,
            available,
            sentence: Vec::new(),
            language,
            history: WordHistory::new(),
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        writeln!(out, "Board ready ({}). Type `help` for commands.", self.language)?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<BoardCommand>() {
                Ok(command) => {
                    if let Flow::Quit = self.handle(command, &mut out)? {
                        break;
                    }
                }
                Err(e) => writeln!(out, "{e}")?,
            }
            out.flush()?;
        }
        Ok(())
    }

    fn handle<W: Write>(&mut self, command: BoardCommand, out: &mut W) -> io::Result<Flow> {
        match command {
            BoardCommand::Tap(id) => {
                let Some(word) = self.engine.vocabulary().get(&id).cloned() else {
                    writeln!(out, "Unknown word: {id}")?;
                    return Ok(Flow::Continue);
                };
                self.engine.speak_word(&word, self.language);
                self.history.record_tap(word.id());
                self.sentence.push(word);
                self.print_sentence(out)?;
                self.print_suggestions(out)?;
            }
            BoardCommand::Play => {
                if self.sentence.is_empty() {
                    writeln!(out, "Nothing to say.")?;
                } else {
                    let _ = self.engine.speak_sentence(&self.sentence, self.language);
                    writeln!(out, "Speaking: {}", self.sentence_text())?;
                }
            }
            BoardCommand::Undo => {
                self.sentence.pop();
                self.print_sentence(out)?;
            }
            BoardCommand::Clear => {
                self.engine.stop();
                self.sentence.clear();
                writeln!(out, "Cleared.")?;
            }
            BoardCommand::Lang(language) => {
                self.language = language;
                writeln!(out, "Language: {language}")?;
                self.print_sentence(out)?;
            }
            BoardCommand::Suggest => self.print_suggestions(out)?,
            BoardCommand::Phrase(id) => match self.engine.quick_phrase(&id) {
                Some(phrase) => {
                    self.engine.speak_phrase(phrase, self.language);
                    writeln!(out, "Speaking: {}", phrase.label.get(self.language))?;
                }
                None => writeln!(out, "Unknown phrase: {id}")?,
            },
            BoardCommand::Phrases => {
                for phrase in self.engine.quick_phrases() {
                    writeln!(out, "{:<24} {}", phrase.id, phrase.label.get(self.language))?;
                }
            }
            BoardCommand::Words => self.print_words(out)?,
            BoardCommand::Recent => {
                let recent = self.history.recent(self.engine.vocabulary());
                self.print_word_list(out, "Recent", &recent)?;
            }
            BoardCommand::Favorites => {
                let favorites = self.history.favorites(self.engine.vocabulary());
                self.print_word_list(out, "Favorites", &favorites)?;
            }
            BoardCommand::Help => writeln!(out, "{HELP}")?,
            BoardCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn sentence_text(&self) -> String {
        self.sentence
            .iter()
            .map(|word| word.label(self.language))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn print_sentence<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.sentence.is_empty() {
            writeln!(out, "Sentence: (empty)")
        } else {
            writeln!(out, "Sentence: {}", self.sentence_text())
        }
    }

    fn print_suggestions<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let suggestions = self.engine.suggest_next(&self.sentence, &self.available);
        if suggestions.is_empty() {
            return writeln!(out, "Suggestions: none");
        }
        let labels: Vec<String> = suggestions
            .iter()
            .map(|word| format!("{} ({})", word.label(self.language), word.id()))
            .collect();
        writeln!(out, "Suggestions: {}", labels.join(", "))
    }

    fn print_word_list<W: Write>(
        &self,
        out: &mut W,
        title: &str,
        words: &[&Word],
    ) -> io::Result<()> {
        if words.is_empty() {
            return writeln!(out, "{title}: none");
        }
        let labels: Vec<&str> = words.iter().map(|word| word.label(self.language)).collect();
        writeln!(out, "{title}: {}", labels.join(", "))
    }

    fn print_words<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for category in self.engine.vocabulary().categories() {
            let ids: Vec<&str> = self
                .available
                .iter()
                .filter(|word| word.category() == category.id)
                .map(Word::id)
                .collect();
            if !ids.is_empty() {
                writeln!(out, "{}: {}", category.label.get(self.language), ids.join(" "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use norah_speech_lib::audio_cache::{AudioCache, DirAudioFetcher};
    use norah_speech_lib::playback::NoAudioOutput;
    use norah_speech_lib::speech::SpeechConfig;
    use norah_speech_lib::synthesis::SilentSynthesizer;

    fn board(language: Language) -> Board {
        let fetcher = Arc::new(DirAudioFetcher::new("no-such-assets", "mp3"));
        let engine = AacEngine::with_parts(
            Arc::new(AudioCache::with_workers(fetcher, 1)),
            Arc::new(NoAudioOutput),
            Arc::new(SilentSynthesizer),
            SpeechConfig::default(),
        );
        Board::new(engine, language)
    }

    fn run_script(board: &mut Board, script: &str) -> String {
        let mut out = Vec::new();
        board.run(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn tap_builds_sentence_and_suggests() {
        let mut board = board(Language::En);
        let output = run_script(&mut board, "tap me\ntap want\n");
        assert!(output.contains("Sentence: me want"));
        assert!(output.contains("Suggestions: eat (eat), drink (drink)"));
        assert_eq!(board.sentence.len(), 2);
    }

    #[test]
    fn unknown_input_keeps_going() {
        let mut board = board(Language::En);
        let output = run_script(&mut board, "tap unicorn\ndance\ntap hi\n");
        assert!(output.contains("Unknown word: unicorn"));
        assert!(output.contains("Unknown command: dance"));
        assert!(output.contains("Sentence: hi"));
    }

    #[test]
    fn language_switch_relabels_sentence() {
        let mut board = board(Language::En);
        let output = run_script(&mut board, "tap hi\ntap please\nlang fr\nplay\n");
        assert!(output.contains("Sentence: salut s'il te plaît"));
        assert!(output.contains("Speaking: salut s'il te plaît"));
    }

    #[test]
    fn undo_clear_and_quit() {
        let mut board = board(Language::En);
        let output = run_script(&mut board, "tap hi\ntap yes\nundo\nclear\nquit\ntap no\n");
        assert!(output.contains("Sentence: hi\n"));
        assert!(output.contains("Cleared."));
        assert!(board.sentence.is_empty());
    }

    #[test]
    fn taps_feed_recents_and_favorites() {
        let mut board = board(Language::En);
        let output = run_script(
            &mut board,
            "favorites\ntap want\ntap eat\nclear\ntap want\ntap more\nrecent\nfavorites\n",
        );
        assert!(output.contains("Favorites: none"));
        assert!(output.contains("Recent: more, want, eat"));
        assert!(output.contains("Favorites: want\n"));
    }

    #[test]
    fn phrases_are_listed_and_spoken() {
        let mut board = board(Language::Fr);
        let output = run_script(&mut board, "phrases\nphrase phrase_im_hungry\nphrase nope\n");
        assert!(output.contains("phrase_im_hungry"));
        assert!(output.contains("Speaking: J'ai faim"));
        assert!(output.contains("Unknown phrase: nope"));
    }
}
