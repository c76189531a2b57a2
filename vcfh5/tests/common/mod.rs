#![allow(dead_code)]
use std::path::{Path, PathBuf};

#[cfg(feature = "clap")]
use vcfh5::clap::LogAndVerbosity;

pub const SAMPLES: [&str; 3] = ["SAMPLE1", "SAMPLE2", "SAMPLE3"];

pub const TEST_VCF: &str = "##fileformat=VCFv4.2
##contig=<ID=chr1,length=2500>
##contig=<ID=chr2,length=800>
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tSAMPLE1\tSAMPLE2\tSAMPLE3
chr1\t100\t.\tA\tG\t.\tPASS\t.\tGT\t0|1\t1|1\t0|0
chr2\t50\t.\tC\tT\t.\tPASS\t.\tGT\t0|0\t0|1\t1|0
";

pub fn write_vcf(dir: &Path) -> PathBuf {
    let path = dir.join("cohort.vcf");
    std::fs::write(&path, TEST_VCF).unwrap();
    path
}

/// A FASTA index with chr1 of 1200 bases and chr2 of 300 bases
pub fn write_fasta_index(dir: &Path) -> PathBuf {
    let fasta = dir.join("ref.fa");
    std::fs::write(dir.join("ref.fa.fai"), "chr1\t1200\t6\t60\t61\nchr2\t300\t1232\t60\t61\n").unwrap();
    fasta
}

/// Write a version 1.0 NPY file from a header dict and raw data
pub fn write_npy(path: &Path, dict: &str, data: &[u8]) {
    let mut header = dict.to_string();
    let total = 10 + header.len() + 1;
    header.push_str(&" ".repeat((64 - total % 64) % 64));
    header.push('\n');

    let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
    bytes.extend((header.len() as u16).to_le_bytes());
    bytes.extend(header.as_bytes());
    bytes.extend(data);
    std::fs::write(path, bytes).unwrap();
}

/// Variants array of `('CHROM', '|S4'), ('POS', '<i4'), ('REF', '|S1')` records
pub fn write_variants(path: &Path, records: &[(&str, i32, &str)]) {
    let mut data = vec![];
    for (chrom, pos, reference) in records {
        let mut chrom = chrom.as_bytes().to_vec();
        chrom.resize(4, 0);
        data.extend(chrom);
        data.extend(pos.to_le_bytes());
        data.extend(&reference.as_bytes()[..1]);
    }
    let dict = format!(
        "{{'descr': [('CHROM', '|S4'), ('POS', '<i4'), ('REF', '|S1')], 'fortran_order': False, 'shape': ({},), }}",
        records.len()
    );
    write_npy(path, &dict, &data);
}

/// Calldata array of `('genotype', '|i1', (2,))` records for 3 samples
pub fn write_calldata(path: &Path, genotypes: &[[[i8; 2]; 3]]) {
    let data: Vec<u8> = genotypes.iter().flatten().flatten().map(|g| *g as u8).collect();
    let dict = format!(
        "{{'descr': [('genotype', '|i1', (2,))], 'fortran_order': False, 'shape': ({}, 3), }}",
        genotypes.len()
    );
    write_npy(path, &dict, &data);
}

/// A stand-in for GNU parallel that runs the commands from stdin one by one
#[cfg(unix)]
pub fn write_fake_parallel(dir: &Path) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-parallel");
    std::fs::write(
        &path,
        "#!/bin/sh\nwhile IFS= read -r cmd; do\n  sh -c \"$cmd\" || exit 1\ndone\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.display().to_string()
}

#[cfg(feature = "clap")]
pub fn silent_verbosity() -> LogAndVerbosity {
    LogAndVerbosity {
        verbosity: 1,
        log_file: None,
        silent: false,
    }
}
