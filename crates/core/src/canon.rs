//! Subject catalog and student-name canonicalization.
//!
//! The application renders subjects with its own display strings (full and
//! abbreviated) and students with accents folded to an apostrophe suffix.
//! Every lookup is exact: a name outside the catalog is an error.

use crate::error::{AutomationError, Result};

/// One entry of the closed subject catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    /// Long form used in the caller's data.
    pub name: &'static str,
    /// Full display name shown by the application.
    pub display: &'static str,
    /// Column header shown in mark grids.
    pub abbreviated: &'static str,
}

pub const RELIGION: &str = "RELIGIONE CATTOLICA O ATTIVITA' ALTERNATIVE";
pub const CONDUCT: &str = "CONDOTTA";

macro_rules! subject {
    ($name:expr, $display:expr, $abbr:expr) => {
        Subject { name: $name, display: $display, abbreviated: $abbr }
    };
    ($name:expr, $abbr:expr) => {
        Subject { name: $name, display: $name, abbreviated: $abbr }
    };
}

pub static CATALOG: &[Subject] = &[
    subject!(
        "BIOLOGIA, MICROBIOLOGIA E TECNOLOGIE DI CONTROLLO AMBIENTALE",
        "BIOLOGIA,MICR.-TECN.CONTR.AMBIENT.",
        "BIOL.MIC.TEC.AMB."
    ),
    subject!("CHIMICA ANALITICA E STRUMENTALE", "CHIM. ANAL. STRUM."),
    subject!("CHIMICA ORGANICA E BIOCHIMICA", "CHIM.ORG. BIOCHIM."),
    subject!("MATEMATICA E COMPLEMENTI DI MATEMATICA", "MATEMATICA E  COMPL."),
    subject!(CONDUCT, "CONDOTTA"),
    subject!("DIRITTO ED ECONOMIA", "DIRITTO ED ECON."),
    subject!("DISEGNO E STORIA DELL'ARTE", "DISEGNO"),
    subject!("FILOSOFIA", "FILOSOFIA"),
    subject!("FISICA", "FISICA"),
    subject!("FISICA AMBIENTALE", "FISICA AMB."),
    subject!("GEOGRAFIA GENERALE ED ECONOMICA", "GEOG.GEN.ECON."),
    subject!("GESTIONE PROGETTO, ORGANIZZAZIONE D'IMPRESA", "GEST.PROG.ORG.IMP."),
    subject!("INFORMATICA", "INFORMATICA"),
    subject!("LINGUA E CULTURA STRANIERA (INGLESE)", "INGLESE"),
    subject!("LINGUA E LETTERATURA ITALIANA", "LETT. ITALIANA"),
    subject!("LINGUA STRANIERA (INGLESE)", "INGLESE"),
    subject!("MATEMATICA", "MATEMATICA"),
    subject!(RELIGION, "RELIGIONE CATTOLICA/ATTIVITA' ALTERNATIVA", "RELIGIONE / ATT. ALT"),
    subject!(
        "SCIENZE E TECNOLOGIE APPLICATE (INFORMATICA)",
        "SCIENZE E TECNOL. APPL. (INFORMATICA)",
        "SC.TECNOLOG.APPL."
    ),
    subject!(
        "SCIENZE E TECNOLOGIE APPLICATE (CHIMICA)",
        "SCIENZE E TECNOL. APPL. (CHIMICA)",
        "SC.TECNOLOG.APPL."
    ),
    subject!("SCIENZE INTEGRATE (CHIMICA)", "CHIMICA"),
    subject!("SCIENZE INTEGRATE (FISICA)", "FISICA"),
    subject!(
        "SCIENZE INTEGRATE (SCIENZE DELLA TERRA E BIOLOGIA)",
        "SCIENZE DELLA TERRA E BIOLOGIA",
        "SC. TERRA E BIOL."
    ),
    subject!("SCIENZE MOTORIE E SPORTIVE", "SC. MOTORIE"),
    subject!(
        "SCIENZE NATURALI (BIOLOGIA, CHIMICA, SCIENZE DELLA TERRA)",
        "SCIENZE NATURALI",
        "SC. NATURALI"
    ),
    subject!("SISTEMI E RETI", "SIST. RETI"),
    subject!("STORIA", "STORIA"),
    subject!("STORIA E GEOGRAFIA", "STORIA-GEOGR."),
    subject!("TECNOLOGIE CHIMICHE INDUSTRIALI", "TECNOL. CHIM. IND."),
    subject!(
        "TECNOLOGIE E PROGETTAZIONE DI SISTEMI INFORMATICI E DI TELECOMUNICAZIONI",
        "TECNOL. PROG. DI SIST. INF. E TELEC.",
        "TEC.PROG.SIST.INF.TE"
    ),
    subject!(
        "TECNOLOGIE E TECNICHE DI RAPPRESENTAZIONE GRAFICA",
        "TECNOL. E TECN. DI RAPP.GRAFICA",
        "TECN.RAPP.GRAFICA"
    ),
    subject!("TECNOLOGIE INFORMATICHE", "TEC.INFORMATICHE"),
    subject!("TELECOMUNICAZIONI", "TELECOMUN."),
];

fn missing(name: &str) -> AutomationError {
    AutomationError::not_found(format!("subject not in catalog: \"{}\"", name))
}

/// Catalog entry for a long-form subject name.
pub fn lookup(name: &str) -> Result<&'static Subject> {
    CATALOG.iter().find(|s| s.name == name).ok_or_else(|| missing(name))
}

pub fn to_display_name(name: &str) -> Result<&'static str> {
    lookup(name).map(|s| s.display)
}

pub fn from_display_name(display: &str) -> Result<&'static str> {
    CATALOG
        .iter()
        .find(|s| s.display == display)
        .map(|s| s.name)
        .ok_or_else(|| missing(display))
}

pub fn to_abbreviated(name: &str) -> Result<&'static str> {
    lookup(name).map(|s| s.abbreviated)
}

/// Reverse abbreviated lookup.
///
/// A few headers are shared by two subjects ("INGLESE", "FISICA",
/// "SC.TECNOLOG.APPL."); those cannot be resolved and fail instead of
/// picking one.
pub fn from_abbreviated(abbreviated: &str) -> Result<&'static str> {
    let mut hits = CATALOG.iter().filter(|s| s.abbreviated == abbreviated);
    match (hits.next(), hits.next()) {
        (Some(s), None) => Ok(s.name),
        (Some(_), Some(_)) => Err(AutomationError::not_found(format!(
            "ambiguous subject header: \"{}\"",
            abbreviated
        ))),
        (None, _) => Err(missing(abbreviated)),
    }
}

pub fn is_religion(name: &str) -> bool {
    name == RELIGION
}

/// Conduct has a mark but no absence count.
pub fn is_conduct(name: &str) -> bool {
    name == CONDUCT
}

// --- Student names ---

const ACCENTS: &[(char, &str)] = &[
    ('à', "a'"),
    ('è', "e'"),
    ('é', "e'"),
    ('ì', "i'"),
    ('ò', "o'"),
    ('ù', "u'"),
    ('À', "A'"),
    ('È', "E'"),
    ('É', "E'"),
    ('Ì', "I'"),
    ('Ò', "O'"),
    ('Ù', "U'"),
];

/// Fold accented vowels, uppercase and trim: `"Città"` becomes `"CITTA'"`.
pub fn canonicalize_student_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        match ACCENTS.iter().find(|(accented, _)| *accented == c) {
            Some((_, plain)) => folded.push_str(plain),
            None => folded.push(c),
        }
    }
    folded.to_uppercase().trim().to_string()
}

/// Comparison key for rendered row text: canonical form without whitespace.
pub fn match_key(text: &str) -> String {
    canonicalize_student_name(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
