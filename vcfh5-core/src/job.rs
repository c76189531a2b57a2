use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::region::Region;

pub const DEFAULT_TEMPLATE: &str =
    "vcf2npy --vcf {vcf} --output {output} --array-type {array_type} --region {region}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayType {
    /// One row per variant
    Variants,
    /// One row per variant, one column per sample
    #[serde(rename = "calldata_2d")]
    Calldata2d,
}

impl ArrayType {
    pub const ALL: [ArrayType; 2] = [ArrayType::Variants, ArrayType::Calldata2d];

    /// Suffix used in the names of the per-region array files
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Variants => "variants",
            Self::Calldata2d => "calldata_2d",
        }
    }

    /// Name of the HDF5 group the arrays are collected into
    pub fn group_name(&self) -> &'static str {
        match self {
            Self::Variants => "variants",
            Self::Calldata2d => "calldata",
        }
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Quote a word for a POSIX shell
pub fn shell_quote(word: &str) -> String {
    if word.is_empty() {
        return String::from("''");
    }

    let is_safe = |c: char| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c);
    if word.chars().all(is_safe) {
        return word.to_string();
    }

    format!("'{}'", word.replace('\'', r"'\''"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Vcf,
    Region,
    Contig,
    Start,
    Stop,
    ArrayType,
    Output,
    OutputDir,
}

impl Placeholder {
    fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "vcf" => Self::Vcf,
            "region" => Self::Region,
            "contig" => Self::Contig,
            "start" => Self::Start,
            "stop" => Self::Stop,
            "array_type" => Self::ArrayType,
            "output" => Self::Output,
            "output_dir" => Self::OutputDir,
            _ => return Err(Error::UnknownPlaceholder { name: name.into() }),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Field(Placeholder),
}

/// Values substituted into a command template for one job
pub struct JobContext<'a> {
    pub vcf: &'a Path,
    pub region: &'a Region,
    pub array_type: ArrayType,
    pub output: &'a Path,
    pub output_dir: &'a Path,
}

impl JobContext<'_> {
    fn value(&self, placeholder: Placeholder) -> String {
        match placeholder {
            Placeholder::Vcf => self.vcf.display().to_string(),
            Placeholder::Region => self.region.to_string(),
            Placeholder::Contig => self.region.contig.clone(),
            Placeholder::Start => self.region.start.map(|v| v.to_string()).unwrap_or_default(),
            Placeholder::Stop => self.region.stop.map(|v| v.to_string()).unwrap_or_default(),
            Placeholder::ArrayType => self.array_type.suffix().to_string(),
            Placeholder::Output => self.output.display().to_string(),
            Placeholder::OutputDir => self.output_dir.display().to_string(),
        }
    }
}

/// A shell command with `{placeholder}` fields. `{{` and `}}` are literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pieces: Vec<Piece>,
}

impl CommandTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut pieces = vec![];
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, c)| *c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, '{')) | None => return Err(Error::UnbalancedBrace { pos }),
                            Some((_, c)) => name.push(c),
                        }
                    }
                    if !literal.is_empty() {
                        pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                    }
                    pieces.push(Piece::Field(Placeholder::from_name(name.trim())?));
                }
                '}' => return Err(Error::UnbalancedBrace { pos }),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self { pieces })
    }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.pieces.contains(&Piece::Field(placeholder))
    }

    pub fn render(&self, ctx: &JobContext) -> String {
        self.pieces.iter().fold(String::new(), |mut acc, piece| {
            match piece {
                Piece::Literal(s) => acc.push_str(s),
                Piece::Field(p) => acc.push_str(&shell_quote(&ctx.value(*p))),
            }
            acc
        })
    }
}

impl Default for CommandTemplate {
    fn default() -> Self {
        // The default template is known to be valid
        Self::parse(DEFAULT_TEMPLATE).unwrap_or(Self { pieces: vec![] })
    }
}

/// `<dir>/<vcf file name>.<region tag>.<array suffix>.npy`
pub fn output_path(dir: &Path, vcf: &Path, region: &Region, array_type: ArrayType) -> PathBuf {
    let name = vcf_file_name(vcf);
    dir.join(format!("{name}.{}.{}.npy", region.tag(), array_type.suffix()))
}

pub fn vcf_file_name(vcf: &Path) -> String {
    vcf.file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("vcf")
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub region: Region,
    pub array_type: ArrayType,
    pub output: PathBuf,
    pub command: String,
}

pub struct JobPlan<'a> {
    pub vcf: &'a Path,
    pub output_dir: &'a Path,
    pub template: &'a CommandTemplate,
    pub extra_args: &'a [String],
}

impl JobPlan<'_> {
    /// One job per region and array type, in region order
    pub fn jobs(&self, regions: &[Region], array_types: &[ArrayType]) -> Vec<Job> {
        let extra = self
            .extra_args
            .iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<String>>()
            .join(" ");

        let mut jobs = Vec::with_capacity(regions.len() * array_types.len());
        for region in regions {
            for array_type in array_types {
                let output = output_path(self.output_dir, self.vcf, region, *array_type);
                let ctx = JobContext {
                    vcf: self.vcf,
                    region,
                    array_type: *array_type,
                    output: &output,
                    output_dir: self.output_dir,
                };

                let mut command = self.template.render(&ctx);
                if !extra.is_empty() {
                    command.push(' ');
                    command.push_str(&extra);
                }

                jobs.push(Job {
                    region: region.clone(),
                    array_type: *array_type,
                    output,
                    command,
                });
            }
        }
        jobs
    }
}
