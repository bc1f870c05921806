use std::str::FromStr;

use norah_speech_lib::vocabulary::{Language, VocabularyError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` takes fewer arguments")]
    UnexpectedArgument(String),
    #[error(transparent)]
    Language(#[from] VocabularyError),
}

/// One line of board input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    Tap(String),
    Play,
    Undo,
    Clear,
    Lang(Language),
    Suggest,
    Phrase(String),
    Phrases,
    Words,
    Recent,
    Favorites,
    Help,
    Quit,
}

pub const HELP: &str = "\
tap <word>     speak a word and add it to the sentence
play           speak the sentence
undo           remove the last word
clear          stop speaking and empty the sentence
lang <en|fr>   switch language
suggest        show suggested next words
phrase <id>    speak a quick phrase
phrases        list quick phrases
words          list board words
recent         list recently tapped words
favorites      list most-tapped words
help           show this help
quit           exit";

impl FromStr for BoardCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(CommandError::UnexpectedArgument(name));
        }

        let bare = |command: BoardCommand| match arg {
            Some(_) => Err(CommandError::UnexpectedArgument(name.clone())),
            None => Ok(command),
        };

        match name.as_str() {
            "tap" => arg
                .map(|id| Self::Tap(id.to_string()))
                .ok_or(CommandError::MissingArgument("tap")),
            "lang" => Ok(Self::Lang(
                arg.ok_or(CommandError::MissingArgument("lang"))?.parse()?,
            )),
            "phrase" => arg
                .map(|id| Self::Phrase(id.to_string()))
                .ok_or(CommandError::MissingArgument("phrase")),
            "play" => bare(Self::Play),
            "undo" => bare(Self::Undo),
            "clear" => bare(Self::Clear),
            "suggest" => bare(Self::Suggest),
            "phrases" => bare(Self::Phrases),
            "words" => bare(Self::Words),
            "recent" => bare(Self::Recent),
            "favorites" | "favs" => bare(Self::Favorites),
            "help" | "?" => bare(Self::Help),
            "quit" | "exit" => bare(Self::Quit),
            _ => Err(CommandError::Unknown(name.clone())),
        }
    }
}
