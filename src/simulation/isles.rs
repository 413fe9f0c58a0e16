//! Isle detection: maximal spans of the hypothesis that already match the
//! reference in order. Isles are exempt from correction within one
//! regeneration cycle and are turned into generator constraints.

/// A contiguous block of hypothesis words confirmed against the reference,
/// addressed by its start position in the hypothesis's own indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Isle {
    pub position: usize,
    pub words: Vec<String>,
}

/// Decomposes the hypothesis/reference pair into the maximal ordered set of
/// non-overlapping matching blocks.
///
/// The longest common contiguous block is selected first (earliest hypothesis
/// start wins ties, then earliest reference start), then the left and right
/// remainders are split recursively. This reproduces left-to-right scanning:
/// among decompositions of equal matched length the leftmost one is returned.
pub fn find_isles(hypothesis: &[String], reference: &[String]) -> Vec<Isle> {
    let mut isles = Vec::new();
    split(hypothesis, reference, 0, &mut isles);
    isles
}

fn split(hypothesis: &[String], reference: &[String], offset: usize, out: &mut Vec<Isle>) {
    if let Some(block) = longest_common_block(hypothesis, reference) {
        split(
            &hypothesis[..block.hyp_start],
            &reference[..block.ref_start],
            offset,
            out,
        );
        out.push(Isle {
            position: offset + block.hyp_start,
            words: hypothesis[block.hyp_start..block.hyp_start + block.len].to_vec(),
        });
        split(
            &hypothesis[block.hyp_start + block.len..],
            &reference[block.ref_start + block.len..],
            offset + block.hyp_start + block.len,
            out,
        );
    }
}

struct CommonBlock {
    hyp_start: usize,
    ref_start: usize,
    len: usize,
}

/// Longest common contiguous block of the two sequences, leftmost on ties.
fn longest_common_block(hypothesis: &[String], reference: &[String]) -> Option<CommonBlock> {
    if hypothesis.is_empty() || reference.is_empty() {
        return None;
    }
    let mut best: Option<CommonBlock> = None;
    // lengths[j] = match length ending at (i, j); rolled over i.
    let mut lengths = vec![0usize; reference.len() + 1];
    for i in 0..hypothesis.len() {
        for j in (0..reference.len()).rev() {
            lengths[j + 1] = if hypothesis[i] == reference[j] {
                lengths[j] + 1
            } else {
                0
            };
            let len = lengths[j + 1];
            if len == 0 {
                continue;
            }
            let candidate = CommonBlock {
                hyp_start: i + 1 - len,
                ref_start: j + 1 - len,
                len,
            };
            let better = match &best {
                None => true,
                Some(b) => {
                    len > b.len
                        || (len == b.len
                            && (candidate.hyp_start, candidate.ref_start)
                                < (b.hyp_start, b.ref_start))
                }
            };
            if better {
                best = Some(candidate);
            }
        }
    }
    best
}

/// True when the isles' concatenation reproduces the reference exactly; the
/// hypothesis is then fully validated without another generator call.
pub fn isles_cover_reference(isles: &[Isle], reference: &[String]) -> bool {
    let mut cursor = 0;
    for isle in isles {
        for word in &isle.words {
            if cursor >= reference.len() || reference[cursor] != *word {
                return false;
            }
            cursor += 1;
        }
    }
    cursor == reference.len()
}
