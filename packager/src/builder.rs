//! rpmbuild invocation.

use crate::error::Result;
use crate::executor::{CommandExecutor, run_tool};
use crate::layout::BuildTree;
use camino::Utf8Path;

/// Runs rpmbuild against a rendered spec.
pub struct RpmBuilder<'a> {
    executor: &'a dyn CommandExecutor,
    program: &'a str,
    tree: &'a BuildTree,
}

impl<'a> RpmBuilder<'a> {
    /// Creates a builder writing into `tree`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, program: &'a str, tree: &'a BuildTree) -> Self {
        Self {
            executor,
            program,
            tree,
        }
    }

    /// Arguments for building binary packages from `spec`.
    ///
    /// `_topdir` is always passed so the output location does not depend on
    /// the user's `~/.rpmmacros`.
    #[must_use]
    pub fn args(&self, spec: &Utf8Path) -> Vec<String> {
        vec![
            "--quiet".to_owned(),
            "-bb".to_owned(),
            "--define".to_owned(),
            format!("_topdir {}", self.tree.top_dir()),
            spec.to_string(),
        ]
    }

    /// Builds the binary packages described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ExternalProcess`](crate::PackagerError::ExternalProcess)
    /// if rpmbuild exits unsuccessfully.
    pub fn build(&self, spec: &Utf8Path) -> Result<()> {
        run_tool(self.executor, self.program, &self.args(spec))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PackagerError;
    use crate::executor::MockCommandExecutor;
    use crate::test_utils::{args_match, failure_output, success_output};

    #[test]
    fn build_passes_topdir_and_spec() {
        let tree = BuildTree::new(Utf8Path::new("/home/ci"));
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .withf(|program, args| {
                program == "rpmbuild"
                    && args_match(
                        args,
                        &[
                            "--quiet",
                            "-bb",
                            "--define",
                            "_topdir /home/ci/rpmbuild",
                            "/home/ci/rpmbuild/SPECS/goputils.spec",
                        ],
                    )
            })
            .times(1)
            .returning(|_, _| Ok(success_output()));

        RpmBuilder::new(&executor, "rpmbuild", &tree)
            .build(&tree.staged_spec("goputils.spec"))
            .expect("rpmbuild succeeds");
    }

    #[test]
    fn build_failure_carries_stderr() {
        let tree = BuildTree::new(Utf8Path::new("/home/ci"));
        let mut executor = MockCommandExecutor::new();
        executor
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(failure_output("error: Bad exit status from /var/tmp/rpm-tmp (%build)\n")));

        let err = RpmBuilder::new(&executor, "rpmbuild", &tree)
            .build(&tree.staged_spec("goputils.spec"))
            .expect_err("rpmbuild fails");

        match err {
            PackagerError::ExternalProcess { tool, stderr, .. } => {
                assert_eq!(tool, "rpmbuild");
                assert_eq!(stderr, "error: Bad exit status from /var/tmp/rpm-tmp (%build)");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
