use std::path::{Path, PathBuf};

use arsenal_solver::{Lot, MalformedInputError, ProblemData, Requirement};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid problem in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: MalformedInputError,
    },
}

/// Accepted layouts of a problem file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProblemFile {
    /// `{ "lots": [...], "requirements": [...] }`
    Structured {
        lots: Vec<Lot>,
        requirements: Vec<Requirement>,
    },
    /// `{ "costs": [...], "constraints": [[...]], "requirements": [...], "armes": [...] }`
    /// with one constraint row per category and one column per lot
    Matrix {
        costs: Vec<f64>,
        constraints: Vec<Vec<f64>>,
        requirements: Vec<f64>,
        #[serde(default)]
        armes: Option<Vec<String>>,
    },
}

pub fn load(path: &Path) -> Result<ProblemData, InputError> {
    let source = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&source).map_err(|err| match err {
        ParseFailure::Json(source) => InputError::Json {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Malformed(source) => InputError::Malformed {
            path: path.to_path_buf(),
            source,
        },
    })
}

enum ParseFailure {
    Json(serde_json::Error),
    Malformed(MalformedInputError),
}

fn parse(source: &str) -> Result<ProblemData, ParseFailure> {
    let file: ProblemFile = serde_json::from_str(source).map_err(ParseFailure::Json)?;
    let data = match file {
        ProblemFile::Structured { lots, requirements } => ProblemData::from_structured_input(lots, requirements),
        ProblemFile::Matrix {
            costs,
            constraints,
            requirements,
            armes,
        } => ProblemData::from_coverage_matrix(&costs, &constraints, &requirements, armes.as_deref()),
    };
    data.map_err(ParseFailure::Malformed)
}
