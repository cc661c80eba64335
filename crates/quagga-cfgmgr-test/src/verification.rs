//! Verification helpers for submitted command sequences
//!
//! Checks framing, presence and relative order of fragments without
//! pinning the whole sequence.

use quagga_config::emitter::{CONFIGURE_TERMINAL, END, WRITE_MEMORY};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected fragment '{fragment}' not found in {sequence:?}")]
    FragmentNotFound {
        fragment: String,
        sequence: Vec<String>,
    },

    #[error("Unexpected fragment '{fragment}' in {sequence:?}")]
    UnexpectedFragment {
        fragment: String,
        sequence: Vec<String>,
    },

    #[error("Expected '{first}' before '{second}'")]
    OrderMismatch { first: String, second: String },

    #[error("Sequence is not framed by {expected:?}: {sequence:?}")]
    FrameMismatch {
        expected: Vec<String>,
        sequence: Vec<String>,
    },

    #[error("Expected {expected} submitted sequences, found {actual}")]
    SubmissionCount { expected: usize, actual: usize },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Fragment-level assertions over one command sequence
pub struct SequenceVerifier<'a> {
    fragments: &'a [String],
}

impl<'a> SequenceVerifier<'a> {
    /// Wraps a submitted fragment list.
    pub fn new(fragments: &'a [String]) -> Self {
        Self { fragments }
    }

    fn position(&self, fragment: &str) -> VerifyResult<usize> {
        self.fragments
            .iter()
            .position(|candidate| candidate == fragment)
            .ok_or_else(|| VerificationError::FragmentNotFound {
                fragment: fragment.to_string(),
                sequence: self.fragments.to_vec(),
            })
    }

    /// Verifies that `fragment` occurs.
    pub fn assert_contains(&self, fragment: &str) -> VerifyResult<()> {
        self.position(fragment).map(|_| ())
    }

    /// Verifies that `fragment` does not occur.
    pub fn assert_absent(&self, fragment: &str) -> VerifyResult<()> {
        match self.position(fragment) {
            Ok(_) => Err(VerificationError::UnexpectedFragment {
                fragment: fragment.to_string(),
                sequence: self.fragments.to_vec(),
            }),
            Err(_) => Ok(()),
        }
    }

    /// Verifies that `first` occurs before `second`.
    pub fn assert_order(&self, first: &str, second: &str) -> VerifyResult<()> {
        if self.position(first)? < self.position(second)? {
            Ok(())
        } else {
            Err(VerificationError::OrderMismatch {
                first: first.to_string(),
                second: second.to_string(),
            })
        }
    }

    /// Verifies the sequence opens with configuration mode followed by
    /// `context`, and closes with `end` and `write memory`.
    pub fn assert_framed(&self, context: &[&str]) -> VerifyResult<()> {
        let head: Vec<&str> = std::iter::once(CONFIGURE_TERMINAL)
            .chain(context.iter().copied())
            .collect();
        let tail = [END, WRITE_MEMORY];

        let framed = self.fragments.len() >= head.len() + tail.len()
            && self.fragments.iter().zip(&head).all(|(have, want)| have == want)
            && self.fragments[self.fragments.len() - tail.len()..]
                .iter()
                .zip(&tail)
                .all(|(have, want)| have == want);

        if framed {
            Ok(())
        } else {
            Err(VerificationError::FrameMismatch {
                expected: head.iter().chain(&tail).map(|s| s.to_string()).collect(),
                sequence: self.fragments.to_vec(),
            })
        }
    }

    /// Fragments between the frame, i.e. the attribute commands.
    pub fn body(&self, context_len: usize) -> &'a [String] {
        let start = (1 + context_len).min(self.fragments.len());
        let end = self.fragments.len().saturating_sub(2).max(start);
        &self.fragments[start..end]
    }
}

/// Verifies the number of submitted sequences.
pub fn assert_submissions(submitted: &[Vec<String>], expected: usize) -> VerifyResult<()> {
    if submitted.len() == expected {
        Ok(())
    } else {
        Err(VerificationError::SubmissionCount {
            expected,
            actual: submitted.len(),
        })
    }
}
