//! Error taxonomy for the advisor client.
//!
//! Display strings are the user-facing (Croatian) messages; transport
//! details are kept in the source chain and in logs.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Temperatura mora biti broj između -50 i 60.")]
    Temperature,
    #[error("Vlaga mora biti broj između 0 i 100.")]
    Humidity,
    #[error("Broj ramova mora biti između 1 i 50.")]
    Frames,
    #[error("Snaga zajednice mora biti između 1 i 10.")]
    Strength,
    #[error("Molimo odaberite prisustvo varoe (Da ili Ne).")]
    Varroa,
    #[error("Molimo odaberite jednu od ponuđenih akcija.")]
    Correction,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Greška pri pozivu API-ja")]
    Transport(#[from] reqwest::Error),
    #[error("Greška pri pozivu API-ja")]
    Status { status: u16, detail: Option<String> },
    #[error("Neočekivani odgovor: {0}")]
    UnexpectedResponse(String),
    #[error("Predikcija nije uspjela: {0}")]
    PredictionFailed(String),
    #[error("Agent je predugo radio. Pokušajte ponovo.")]
    Timeout { attempts: u32 },
    #[error("neispravan URL servisa '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Validation(#[from] FieldError),
    #[error("Agent već obrađuje prethodnu opservaciju.")]
    Busy,
    #[error("Nema predikcije na koju se feedback odnosi.")]
    NoPrediction,
    #[error(transparent)]
    Client(#[from] ClientError),
}
