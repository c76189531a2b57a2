use std::path::PathBuf;

use color_eyre::Result;

use crate::io::vcf_samples;

#[doc(hidden)]
pub fn run(vcf: PathBuf) -> Result<()> {
    let ids = vcf_samples(&vcf)?;
    tracing::debug!("{} samples in {vcf:?}", ids.len());
    for id in ids {
        println!("{id}");
    }
    Ok(())
}
