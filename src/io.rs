use crate::graph::{BaseGraph, Hypergraph};
use crate::tree_decomposition::{NodeId, TreeDecomposition};
use fxhash::FxHashMap;
use std::convert::TryFrom;
use std::io;
use std::io::{BufRead, Write};

fn invalid_input(line: usize, message: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("line {}: {}", line, message),
    )
}

fn parse_numbers(line: &str, number: usize) -> Result<Vec<usize>, io::Error> {
    line.split_whitespace()
        .map(|s| s.parse().map_err(|_| invalid_input(number, "invalid number")))
        .collect()
}

/// Parses the `p tw <vertices> <edges>` header.
pub fn pace_p(line: &str, number: usize) -> Result<(usize, usize), io::Error> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("p") || tokens.next() != Some("tw") {
        return Err(invalid_input(number, "expected 'p tw <n> <m>'"));
    }
    let nums = parse_numbers(&tokens.collect::<Vec<_>>().join(" "), number)?;
    match nums.as_slice() {
        [n, m] => Ok((*n, *m)),
        _ => Err(invalid_input(number, "expected 'p tw <n> <m>'")),
    }
}

/// Parses an edge line. Ids are 1-based in the file and 0-based in the result.
pub fn pace_e(line: &str, number: usize, order: usize) -> Result<Vec<usize>, io::Error> {
    let nums = parse_numbers(line, number)?;
    if nums.len() < 2 {
        return Err(invalid_input(number, "an edge needs at least two vertices"));
    }
    nums.into_iter()
        .map(|v| {
            if v == 0 || v > order {
                Err(invalid_input(number, "vertex id out of range"))
            } else {
                Ok(v - 1)
            }
        })
        .collect()
}

/// Reads graphs in the PACE `.gr` format. Lines with more than two vertices are read as
/// hyperedges.
pub struct PaceReader<T: BufRead>(pub T);

impl<T: BufRead> TryFrom<PaceReader<T>> for Hypergraph {
    type Error = io::Error;

    fn try_from(reader: PaceReader<T>) -> Result<Self, Self::Error> {
        let reader = reader.0;
        let mut graph: Option<Hypergraph> = None;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let number = i + 1;
            let trimmed = line.trim();
            match trimmed.chars().next() {
                None | Some('c') => {}
                Some('p') => {
                    if graph.is_some() {
                        return Err(invalid_input(number, "duplicate header"));
                    }
                    let (n, _) = pace_p(trimmed, number)?;
                    graph = Some(Hypergraph::new(n));
                }
                _ => {
                    let graph = graph
                        .as_mut()
                        .ok_or_else(|| invalid_input(number, "edge before header"))?;
                    let elements = pace_e(trimmed, number, graph.order())?;
                    graph.add_hyperedge(elements);
                }
            }
        }
        graph.ok_or_else(|| invalid_input(0, "missing header"))
    }
}

/// Writes a decomposition in the PACE `.td` format. Nodes are numbered 1.. in pre-order.
pub struct PaceWriter<'a, W: Write> {
    td: &'a TreeDecomposition,
    graph: &'a dyn BaseGraph,
    writer: W,
}

impl<'a, W: Write> PaceWriter<'a, W> {
    pub fn new(td: &'a TreeDecomposition, graph: &'a dyn BaseGraph, writer: W) -> Self {
        Self { td, graph, writer }
    }

    pub fn output(mut self) -> io::Result<()> {
        let order: Vec<NodeId> = self.td.dfs().collect();
        let ids: FxHashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, n)| (*n, i + 1)).collect();

        writeln!(
            self.writer,
            "s td {} {} {}",
            order.len(),
            self.td.max_bag_size(),
            self.graph.order()
        )?;
        for node in order.iter() {
            write!(self.writer, "b {}", ids[node])?;
            for v in self.td.bag(*node) {
                write!(self.writer, " {}", v + 1)?;
            }
            writeln!(self.writer)?;
        }
        for node in order.iter() {
            if let Some(parent) = self.td.parent(*node) {
                writeln!(self.writer, "{} {}", ids[&parent], ids[node])?;
            }
        }
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{BaseGraph, HyperedgeGraph, Hypergraph};
    use crate::io::{PaceReader, PaceWriter};
    use crate::tree_decomposition::TreeDecomposition;
    use std::convert::TryFrom;
    use std::io::{Cursor, ErrorKind};

    #[test]
    fn reads_graph_with_hyperedges() {
        let input = "c a comment\np tw 5 3\n1 2\n2 3 4\n\nc trailing\n4 5\n";
        let graph = Hypergraph::try_from(PaceReader(Cursor::new(input))).unwrap();
        assert_eq!(graph.order(), 5);
        assert_eq!(graph.hyperedge_count(), 3);
        assert_eq!(graph.hyperedge(1).unwrap().elements(), &[1, 2, 3]);
        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(1, 3));
        assert!(graph.has_edge(3, 4));
        assert!(!graph.has_edge(0, 4));
    }

    #[test]
    fn rejects_bad_input() {
        for input in [
            "1 2\n",
            "p tw 2 1\n1 3\n",
            "p tw 2 1\n0 1\n",
            "p tw 2 1\n1 x\n",
            "p tw 2 1\n1\n",
            "p td 2 1\n",
            "c nothing\n",
        ]
        .iter()
        {
            let result = Hypergraph::try_from(PaceReader(Cursor::new(*input)));
            assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput, "{}", input);
        }
    }

    #[test]
    fn writes_decomposition() {
        let mut graph = Hypergraph::new(3);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        let mut td = TreeDecomposition::new();
        let root = td.insert_root(vec![0, 1], vec![0]);
        td.add_child(root, vec![1, 2], vec![1]);

        let mut buffer = Vec::new();
        PaceWriter::new(&td, &graph, &mut buffer).output().unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "s td 2 2 3\nb 1 1 2\nb 2 2 3\n1 2\n");
    }
}
