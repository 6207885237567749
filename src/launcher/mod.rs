//! Build/run launcher: turns command-line flags into an ordered plan of
//! external tool invocations and executes it, stopping at the first failure.

mod sources;
mod staging;
mod tool;

use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};

use crate::config::ProjectLayout;

pub use sources::{collect_sources, SOURCE_EXTENSIONS};
pub use staging::{mirror_dir, Staged};
pub use tool::{DryRunner, SystemRunner, ToolCommand, ToolError, ToolRunner};

/// Actions requested on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    pub build: bool,
    pub make: bool,
    pub run: bool,
    pub format: bool,
    pub check: Option<PathBuf>,
}

impl Flags {
    pub fn is_empty(&self) -> bool {
        !self.build && !self.make && !self.run && !self.format && self.check.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Configure,
    Compile,
    StageScripts,
    Run,
    Format,
    Check(PathBuf),
}

/// Orders the steps for `flags`. With no flags the project is configured,
/// compiled and run.
pub fn plan(flags: &Flags) -> Vec<Step> {
    if flags.is_empty() {
        return vec![Step::Configure, Step::Compile, Step::StageScripts, Step::Run];
    }

    let mut steps = Vec::new();
    if flags.build {
        steps.extend([Step::Configure, Step::Compile]);
    }
    if flags.make {
        steps.push(Step::Compile);
    }
    if flags.run {
        steps.extend([Step::StageScripts, Step::Run]);
    }
    if flags.format {
        steps.push(Step::Format);
    }
    if let Some(file) = &flags.check {
        steps.push(Step::Check(file.clone()));
    }
    steps
}

pub struct Launcher {
    layout: ProjectLayout,
    runner: Box<dyn ToolRunner>,
}

impl Launcher {
    pub fn new(layout: ProjectLayout, runner: Box<dyn ToolRunner>) -> Self {
        Self { layout, runner }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Executes `steps` in order. The first failing step aborts the rest.
    pub fn execute(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            self.execute_step(step)?;
        }
        Ok(())
    }

    fn execute_step(&mut self, step: &Step) -> Result<()> {
        if *step == Step::StageScripts {
            return self.stage_scripts();
        }
        match self.command_for(step)? {
            Some(command) => self.runner.run(&command)?,
            None => warn!(
                "no C++ sources under {}; nothing to format",
                self.layout.source_dir.display()
            ),
        }
        Ok(())
    }

    fn stage_scripts(&self) -> Result<()> {
        let layout = &self.layout;
        if self.runner.is_dry_run() {
            info!(
                "would mirror {} to {}",
                layout.scripts_dir.display(),
                layout.staged_scripts_dir.display()
            );
            return Ok(());
        }
        mirror_dir(
            &layout.scripts_dir,
            &layout.staged_data_dir,
            &layout.staged_scripts_dir,
        )?;
        Ok(())
    }

    /// Builds the external command for `step`. Returns `None` for a format
    /// step with nothing to format.
    pub fn command_for(&self, step: &Step) -> Result<Option<ToolCommand>> {
        let layout = &self.layout;
        let root = &layout.root;
        let command = match step {
            Step::Configure => ToolCommand::new("cmake", root)
                .arg("-B")
                .arg(&layout.build_dir)
                .arg("-S")
                .arg(root),
            Step::Compile => ToolCommand::new("cmake", root)
                .arg("--build")
                .arg(&layout.build_dir),
            Step::Run => ToolCommand::new(layout.target_path(), root),
            Step::Format => {
                let sources = collect_sources(&layout.source_dir)?;
                if sources.is_empty() {
                    return Ok(None);
                }
                ToolCommand::new("clang-format", root)
                    .args(["--verbose", "-i", "-style=file"])
                    .args(sources)
            }
            Step::Check(file) => ToolCommand::new("clang-tidy", root)
                .arg("-p")
                .arg(layout.compile_commands())
                .arg("-header-filter=.*")
                .arg(file),
            Step::StageScripts => return Ok(None),
        };
        Ok(Some(command))
    }
}
