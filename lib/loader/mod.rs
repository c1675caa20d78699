//! Loading program snapshots into Ripple.
//!
//! A snapshot is a directory laid out as:
//!
//! * `source/`: Java sources of production classes.
//! * `bytecode/`: decompiled class files of production classes, one `.json`
//! per `.java`, at the same relative path.
//! * `test-source/` and `test-bytecode/`: the same for test classes.
//!
//! Class files without a matching source are loaded without source text.

pub mod json;

use crate::il;
use crate::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Generic trait for all loaders
pub trait Loader {
    /// Load the whole program.
    fn program(&self) -> Result<il::Program, Error>;
}

/// A program snapshot on disk.
#[derive(Clone, Debug)]
pub struct Snapshot {
    root: PathBuf,
}

impl Snapshot {
    /// Create a new `Snapshot` rooted at the given directory.
    pub fn new<P: Into<PathBuf>>(root: P) -> Snapshot {
        Snapshot { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every class file under `bytecode`, pairing it with the source
    /// under `source` at the same relative path.
    fn classes(&self, source: &str, bytecode: &str) -> Result<Vec<il::Class>, Error> {
        let source_root = self.root.join(source);
        let bytecode_root = self.root.join(bytecode);

        let mut files = Vec::new();
        if bytecode_root.is_dir() {
            find_files(&bytecode_root, "json", &mut files)?;
        }
        files.sort();

        let mut classes = Vec::new();
        for file in files {
            let mut class = json::Json::from_file(&file)?.into_class();

            let relative = file
                .strip_prefix(&bytecode_root)
                .map_err(|_| Error::Custom(format!("{} escapes its root", file.display())))?;
            let source_file = source_root.join(relative).with_extension("java");
            if source_file.is_file() {
                class.set_source(Some(fs::read_to_string(&source_file)?));
            }

            debug!("loaded {} from {}", class.name(), file.display());
            classes.push(class);
        }

        Ok(classes)
    }
}

impl Loader for Snapshot {
    fn program(&self) -> Result<il::Program, Error> {
        let mut program = il::Program::new();
        for class in self.classes("source", "bytecode")? {
            program.add_class(class);
        }
        for class in self.classes("test-source", "test-bytecode")? {
            program.add_test_class(class);
        }
        info!(
            "loaded {} methods from {}",
            program.all_methods().count(),
            self.root.display()
        );
        Ok(program)
    }
}

/// Load the program snapshot rooted at the given directory.
pub fn load_program(root: &Path) -> Result<il::Program, Error> {
    Snapshot::new(root).program()
}

fn find_files(directory: &Path, extension: &str, files: &mut Vec<PathBuf>) -> Result<(), Error> {
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            find_files(&path, extension, files)?;
        } else if path.extension().map_or(false, |e| e == extension) {
            files.push(path);
        }
    }
    Ok(())
}
