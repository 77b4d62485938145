#![allow(missing_docs)]

use itertools::Itertools;

use crate::prelude::*;

impl<S: Symbol> Nfa<S> {
    /// Compute the graphviz representation of the automaton, for more information on
    /// the DOT format, see the [graphviz documentation](https://graphviz.org/doc/info/lang.html).
    /// Begin states are fed from a point-shaped entry node, end states are drawn with
    /// a double circle and epsilon edges are labeled ε.
    pub fn dot_representation(&self) -> String {
        let header = [
            "digraph fsa {".to_string(),
            "  rankdir=LR;".to_string(),
            "  init [shape=point];".to_string(),
        ];
        let states = self.states().into_iter().map(|q| {
            let shape = if self.ends().contains(&q) {
                "doublecircle"
            } else {
                "circle"
            };
            format!("  {} [shape={}]", q.show(), shape)
        });
        let entries = self
            .begins()
            .iter()
            .map(|q| format!("  init -> {}", q.show()));
        let transitions = self.edges().map(|e| {
            format!(
                "  {} -> {} [label=\"{}\"]",
                e.source.show(),
                e.target.show(),
                e.label.show()
            )
        });

        header
            .into_iter()
            .chain(states)
            .chain(entries)
            .chain(transitions)
            .chain(std::iter::once("}".to_string()))
            .join("\n")
    }

    /// Renders the automaton visually (as PNG) and returns a vec of bytes encoding the
    /// rendered image. This method is only available on the `graphviz` crate feature
    /// and requires the `dot` executable.
    #[cfg(feature = "graphviz")]
    pub fn render(&self) -> Result<Vec<u8>, std::io::Error> {
        use std::io::{Read, Write};

        use tracing::trace;
        let dot = self.dot_representation();
        trace!("writing dot representation\n{}", dot);

        let mut child = std::process::Command::new("dot")
            .arg("-Tpng")
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes())?;
        }
        let mut output = Vec::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_end(&mut output)?;
        }

        let status = child.wait()?;
        if !status.success() {
            tracing::error!("could not render, dot exited with {status}");
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "dot exited unsuccessfully",
            ));
        }
        Ok(output)
    }

    /// Renders the automaton into a temporary PNG file and returns its path. The file
    /// is kept around so an image viewer can be pointed at it.
    #[cfg(feature = "graphviz")]
    pub fn render_tempfile(&self) -> Result<std::path::PathBuf, std::io::Error> {
        use std::io::Write;

        let png = self.render()?;
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&png)?;
        let (_file, path) = file.keep().map_err(|e| e.error)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use crate::tests::ab_nfa;

    #[test]
    fn dot_output_shape() {
        let dot = ab_nfa().opt().dot_representation();
        assert!(dot.starts_with("digraph fsa {"));
        assert!(dot.ends_with('}'));
        assert!(dot.contains("[label=\"a\"]"));
        assert!(dot.contains("[label=\"ε\"]"));
        assert!(dot.contains("doublecircle"));
        assert!(dot.contains("init -> "));
    }
}
