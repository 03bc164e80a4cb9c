/* Copyright (C) 2022 Antmicro
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

/// Board definitions shipped with the tool.
pub const BUILTIN_BOARDS: &str = include_str!("../boards/boards.txt");
/// Wing definitions shipped with the tool.
pub const BUILTIN_WINGS: &str = include_str!("../boards/wings.txt");

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Can't open file {path}: {source}")]
    CantOpenFile { path: String, source: std::io::Error },
    #[error("Can't read file {path}: {source}")]
    CantReadFile { path: String, source: std::io::Error },
}

pub struct OpenOpts {
    /// Read the file as is, without gzip decompression.
    pub raw: bool,
}

impl Default for OpenOpts {
    fn default() -> Self {
        Self { raw: true }
    }
}

impl OpenOpts {
    /// Files ending in `.gz` get decompressed.
    pub fn for_path<P>(path: P) -> Self where P: AsRef<Path> {
        let gzipped = path.as_ref()
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"));
        Self { raw: !gzipped }
    }
}

/// Reads a whole text file.
pub fn open<P>(path: P, opts: OpenOpts) -> Result<String, LoadError> where
    P: AsRef<Path>,
{
    let display = path.as_ref().display().to_string();

    let file = File::open(&path)
        .map_err(|source| LoadError::CantOpenFile { path: display.clone(), source })?;

    let mut reader: Box<dyn Read> = if opts.raw {
        Box::new(BufReader::new(file))
    } else {
        Box::new(BufReader::new(GzDecoder::new(file)))
    };

    let mut text = String::new();
    reader.read_to_string(&mut text)
        .map_err(|source| LoadError::CantReadFile { path: display, source })?;

    Ok(text)
}

/// [`open`] with options picked from the file name.
pub fn read_text<P>(path: P) -> Result<String, LoadError> where P: AsRef<Path> {
    let opts = OpenOpts::for_path(&path);
    open(path, opts)
}
