#![allow(
    clippy::large_enum_variant,
    clippy::too_many_arguments,
    clippy::uninlined_format_args,
    clippy::missing_errors_doc,
    clippy::unreadable_literal,
    clippy::too_many_lines,
    clippy::must_use_candidate,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::match_bool,
    clippy::single_match_else,
    clippy::cast_possible_truncation,
    clippy::needless_pass_by_value,
    clippy::default_trait_access,
    clippy::struct_field_names
)]

// VCFH5 - VCF to HDF5 conversion toolkit
// Copyright (C) 2024  The vcfh5 authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

//! VCFH5 - VCF to HDF5 conversion toolkit
//!
//! Splits a VCF into regions, runs a per-region `vcf2npy` extraction for each of them through GNU
//! parallel and concatenates the resulting `.npy` arrays into chunked HDF5 datasets.

pub mod args;
pub mod io;

#[cfg(feature = "clap")]
pub mod clap;

/// VCFH5 commands
pub mod subcommands;
