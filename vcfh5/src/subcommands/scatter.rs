use std::path::PathBuf;
use std::time::Instant;

use color_eyre::eyre::{ensure, WrapErr};
use color_eyre::Result;
use itertools::Itertools;

use vcfh5_core::{CommandTemplate, Job, JobPlan, Manifest, Parallel};

use crate::args::{to_array_types, ArrayTypeOption, ParallelArgs, RegionArgs};
use crate::io::create_dir;
use crate::subcommands::list_regions;

#[derive(Debug, Clone)]
pub struct ScatterArgs {
    pub vcf: PathBuf,
    pub region_args: RegionArgs,
    pub output_dir: PathBuf,
    pub array_types: Vec<ArrayTypeOption>,
    pub template: String,
    pub extra_args: Vec<String>,
    pub parallel_args: ParallelArgs,
    pub skip_existing: bool,
    pub dry_run: bool,
}

/// Commands of the jobs that still need to run
pub fn pending_commands(jobs: &[Job], skip_existing: bool) -> Vec<String> {
    jobs.iter()
        .filter(|job| {
            let exists = skip_existing && job.output.exists();
            if exists {
                tracing::debug!("Skipping {}, {:?} exists", job.region, job.output);
            }
            !exists
        })
        .map(|job| job.command.clone())
        .collect()
}

#[doc(hidden)]
pub fn run(args: ScatterArgs) -> Result<()> {
    let now = Instant::now();

    let template = CommandTemplate::parse(&args.template)
        .wrap_err_with(|| format!("Invalid command template: {}", args.template))?;
    let array_types = to_array_types(&args.array_types);

    let regions = list_regions::resolve(&args.vcf, &args.region_args)?;
    ensure!(
        !regions.is_empty(),
        "No regions to process for {:?}, give a FASTA with an index or regions",
        args.vcf
    );

    let plan = JobPlan {
        vcf: &args.vcf,
        output_dir: &args.output_dir,
        template: &template,
        extra_args: &args.extra_args,
    };
    let jobs = plan.jobs(&regions, &array_types);
    let commands = pending_commands(&jobs, args.skip_existing);

    tracing::info!(
        "{} regions x {} = {} jobs, {} to run",
        regions.len(),
        array_types.iter().join(", "),
        jobs.len(),
        commands.len()
    );

    if args.dry_run {
        for command in commands {
            println!("{command}");
        }
        return Ok(());
    }

    create_dir(&args.output_dir)?;
    let manifest_path = Manifest::path_for_vcf(&args.output_dir, &args.vcf);
    Manifest::from_jobs(&args.vcf, &args.output_dir, &jobs).write(&manifest_path)?;
    tracing::info!("Wrote manifest to {manifest_path:?}");

    if commands.is_empty() {
        tracing::info!("All outputs exist, nothing to run");
        return Ok(());
    }

    let parallel = Parallel::from(args.parallel_args);
    parallel
        .run(&commands)
        .wrap_err_with(|| format!("Extracting {:?} failed", args.vcf))?;

    tracing::info!("Ran {} jobs in {:?}", commands.len(), now.elapsed());
    Ok(())
}
