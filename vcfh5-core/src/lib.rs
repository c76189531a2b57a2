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

pub mod error;
pub mod job;
pub mod manifest;
pub mod npy;
pub mod parallel;
pub mod reference;
pub mod region;
pub mod store;

pub use error::Error;
pub use job::{ArrayType, CommandTemplate, Job, JobPlan};
pub use manifest::Manifest;
pub use parallel::Parallel;
pub use reference::Contig;
pub use region::Region;
pub use store::{Compression, StoreOptions};
