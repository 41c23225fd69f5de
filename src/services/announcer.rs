//! Notification sink that turns sequence events into audio cues and speech

use std::sync::RwLock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::{engine::NotificationSink, state::Settings};

/// Event an announcement was produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    Transition,
    Finished,
    Started,
    Warning,
}

/// Synthesised sound played with an announcement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Short falling tone between two countdowns
    Beep,
    /// Arpeggio at the end of the sequence
    Completion,
}

/// What the audio layer should play and say
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub kind: AnnouncementKind,
    pub cue: Option<Cue>,
    pub speech: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Language of spoken phrases, picked from the selected voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Dutch,
    French,
    German,
    Spanish,
}

impl Language {
    /// Derive the language from a voice identifier like `nl-NL`.
    /// Unknown or missing voices fall back to English.
    pub fn from_voice(voice: Option<&str>) -> Self {
        let code = voice
            .and_then(|v| v.split(['-', '_']).next())
            .map(str::to_lowercase);
        match code.as_deref() {
            Some("nl") => Self::Dutch,
            Some("fr") => Self::French,
            Some("de") => Self::German,
            Some("es") => Self::Spanish,
            _ => Self::English,
        }
    }

    pub fn starting(self, label: &str) -> String {
        match self {
            Self::English => format!("Starting {label}"),
            Self::Dutch => format!("Starten met {label}"),
            Self::French => format!("Début de {label}"),
            Self::German => format!("Beginne mit {label}"),
            Self::Spanish => format!("Comenzando {label}"),
        }
    }

    pub fn seconds_remaining(self, seconds: u64) -> String {
        match self {
            Self::English => format!("{seconds} seconds remaining"),
            Self::Dutch => format!("Nog {seconds} seconden"),
            Self::French => format!("Il reste {seconds} secondes"),
            Self::German => format!("Noch {seconds} Sekunden"),
            Self::Spanish => format!("Quedan {seconds} segundos"),
        }
    }

    pub fn finished(self) -> &'static str {
        match self {
            Self::English => "Presentation finished",
            Self::Dutch => "Presentatie afgelopen",
            Self::French => "Présentation terminée",
            Self::German => "Präsentation beendet",
            Self::Spanish => "Presentación terminada",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct VoicePrefs {
    muted: bool,
    voice_enabled: bool,
    language: Language,
}

impl From<&Settings> for VoicePrefs {
    fn from(settings: &Settings) -> Self {
        Self {
            muted: settings.muted,
            voice_enabled: settings.voice_enabled,
            language: Language::from_voice(settings.voice.as_deref()),
        }
    }
}

/// [`NotificationSink`] publishing [`Announcement`]s on a broadcast channel
#[derive(Debug)]
pub struct Announcer {
    prefs: RwLock<VoicePrefs>,
    tx: broadcast::Sender<Announcement>,
}

impl Announcer {
    pub fn new(settings: &Settings) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            prefs: RwLock::new(VoicePrefs::from(settings)),
            tx,
        }
    }

    /// Receive every announcement published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Announcement> {
        self.tx.subscribe()
    }

    /// Pick up new mute, voice and language preferences
    pub fn apply_settings(&self, settings: &Settings) {
        match self.prefs.write() {
            Ok(mut prefs) => *prefs = VoicePrefs::from(settings),
            Err(e) => warn!("Failed to update announcer preferences: {}", e),
        }
    }

    fn prefs(&self) -> Option<VoicePrefs> {
        match self.prefs.read() {
            Ok(prefs) => Some(*prefs),
            Err(e) => {
                warn!("Failed to read announcer preferences: {}", e);
                None
            }
        }
    }

    fn announce<F>(&self, kind: AnnouncementKind, cue: Option<Cue>, speech: F)
    where
        F: FnOnce(Language) -> String,
    {
        let Some(prefs) = self.prefs() else {
            return;
        };
        if prefs.muted {
            return;
        }
        let speech = prefs.voice_enabled.then(|| speech(prefs.language));
        if cue.is_none() && speech.is_none() {
            return;
        }

        let announcement = Announcement {
            kind,
            cue,
            speech,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.tx.send(announcement) {
            debug!("No announcement listeners: {}", e);
        }
    }
}

impl NotificationSink for Announcer {
    fn transition(&self, next_label: &str) {
        self.announce(AnnouncementKind::Transition, Some(Cue::Beep), |lang| {
            lang.starting(next_label)
        });
    }

    fn finished(&self) {
        self.announce(AnnouncementKind::Finished, Some(Cue::Completion), |lang| {
            lang.finished().to_string()
        });
    }

    fn started(&self, label: &str) {
        self.announce(AnnouncementKind::Started, None, |lang| lang.starting(label));
    }

    fn warning(&self, seconds_remaining: u64) {
        self.announce(AnnouncementKind::Warning, None, |lang| {
            lang.seconds_remaining(seconds_remaining)
        });
    }
}
