//! Estimates of the I/O a command line did.
//!
//! Counts come from the command text. A line is split into segments on
//! `;`, `|` and `&`, so chained and `&`-parallel invocations each count.
//! Byte totals start from a per-operation guess and are raised to the
//! length of the captured output, which read-shaped and network commands
//! mostly echo back. The numbers are coarse by nature.

use shellward_core::{FileSystemOperations, NetworkActivity};

/// Commands that read files.
pub const READ_VERBS: &[&str] = &[
    "cat", "head", "tail", "grep", "egrep", "fgrep", "rg", "find", "ls", "less", "more", "wc",
    "diff", "sort", "uniq", "stat", "file",
];

/// Commands that write files.
pub const WRITE_VERBS: &[&str] = &["cp", "mv", "touch", "mkdir", "tee", "dd", "install", "ln"];

/// Commands that talk to the network.
pub const NETWORK_VERBS: &[&str] = &["curl", "wget", "ssh", "scp", "rsync", "ping", "nc", "ftp"];

/// `git` subcommands that talk to a remote.
pub const GIT_NETWORK_SUBCOMMANDS: &[&str] = &["pull", "push", "clone", "fetch"];

/// Multiplier applied when a segment contains a glob.
pub const WILDCARD_FACTOR: u64 = 10;

/// Bytes assumed per file operation.
pub const BYTES_PER_FILE_OP: u64 = 4 * 1024;

/// Bytes assumed per network request.
pub const BYTES_PER_REQUEST: u64 = 64 * 1024;

/// Split on `;`, `|` and `&`, keeping `>&` and `<&` inside their segment.
fn segments(command: &str) -> impl Iterator<Item = &str> {
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut prev = None;
    for (i, c) in command.char_indices() {
        let split = match c {
            ';' | '|' => true,
            '&' => !matches!(prev, Some('>' | '<')),
            _ => false,
        };
        if split {
            parts.push(&command[start..i]);
            start = i.saturating_add(c.len_utf8());
        }
        prev = Some(c);
    }
    parts.push(&command[start..]);
    parts.into_iter().map(str::trim).filter(|s| !s.is_empty())
}

/// Strip leading `VAR=value` assignments and a path prefix from the verb.
fn words(segment: &str) -> (Option<&str>, impl Iterator<Item = &str>) {
    let mut iter = segment
        .split_whitespace()
        .skip_while(|w| w.contains('=') && !w.starts_with('='));
    let verb = iter
        .next()
        .map(|v| v.rsplit('/').next().unwrap_or(v));
    (verb, iter)
}

/// Redirections writing to a file: `>` and `>>`, not `>&`.
fn redirections(segment: &str) -> u64 {
    let bytes = segment.as_bytes();
    let mut count = 0u64;
    let mut i = 0usize;
    while let Some(&b) = bytes.get(i) {
        if b == b'>' {
            let mut next = i.saturating_add(1);
            if bytes.get(next) == Some(&b'>') {
                next = next.saturating_add(1);
            }
            if bytes.get(next) != Some(&b'&') {
                count = count.saturating_add(1);
            }
            i = next;
        } else {
            i = i.saturating_add(1);
        }
    }
    count
}

/// Estimate reads and writes from the verbs and redirections in `command`.
///
/// `output_len` is the captured stdout plus stderr length in bytes; a
/// command that reads is credited with at least that many bytes read.
#[must_use]
pub fn estimate_file_operations(command: &str, output_len: usize) -> FileSystemOperations {
    let mut ops = FileSystemOperations::default();

    for segment in segments(command) {
        let factor = if segment.contains(['*', '?']) {
            WILDCARD_FACTOR
        } else {
            1
        };
        let (verb, _) = words(segment);

        if let Some(verb) = verb {
            if READ_VERBS.contains(&verb) {
                ops.reads = ops.reads.saturating_add(factor);
            } else if WRITE_VERBS.contains(&verb) {
                ops.writes = ops.writes.saturating_add(factor);
                if matches!(verb, "cp" | "mv" | "install") {
                    ops.reads = ops.reads.saturating_add(factor);
                }
            }
        }

        let redirects = redirections(segment);
        if redirects > 0 && verb != Some("dd") {
            ops.writes = ops.writes.saturating_add(redirects);
        }
        if segment.contains('<') {
            ops.reads = ops.reads.saturating_add(1);
        }
    }

    ops.bytes_read = observed(ops.reads, BYTES_PER_FILE_OP, output_len);
    ops.bytes_written = ops.writes.saturating_mul(BYTES_PER_FILE_OP);
    ops
}

/// Estimate network requests from the verbs in `command`.
///
/// `output_len` is the captured stdout plus stderr length in bytes; a
/// command that talks to the network is credited with at least that many
/// bytes transferred.
#[must_use]
pub fn estimate_network_activity(command: &str, output_len: usize) -> NetworkActivity {
    let requests = segments(command)
        .filter(|segment| {
            let (verb, mut rest) = words(segment);
            match verb {
                Some("git") => rest
                    .find(|w| !w.starts_with('-'))
                    .is_some_and(|sub| GIT_NETWORK_SUBCOMMANDS.contains(&sub)),
                Some(verb) => NETWORK_VERBS.contains(&verb),
                None => false,
            }
        })
        .count();
    let requests = u64::try_from(requests).unwrap_or(u64::MAX);

    NetworkActivity {
        requests,
        bytes_transferred: observed(requests, BYTES_PER_REQUEST, output_len),
    }
}

/// `count` operations of `per_op` bytes, or the output length when larger.
/// Zero operations is zero bytes whatever the output.
fn observed(count: u64, per_op: u64, output_len: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    let output = u64::try_from(output_len).unwrap_or(u64::MAX);
    count.saturating_mul(per_op).max(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_commands() {
        let ops = estimate_file_operations("cat README.md", 0);
        assert_eq!(ops.reads, 1);
        assert_eq!(ops.writes, 0);
        assert_eq!(ops.bytes_read, BYTES_PER_FILE_OP);
    }

    #[test]
    fn test_wildcards_scale_up() {
        let ops = estimate_file_operations("grep TODO src/*.rs", 0);
        assert_eq!(ops.reads, WILDCARD_FACTOR);
    }

    #[test]
    fn test_writes_and_redirection() {
        assert_eq!(estimate_file_operations("mkdir build", 0).writes, 1);
        assert_eq!(estimate_file_operations("echo hi > out.txt", 0).writes, 1);
        assert_eq!(estimate_file_operations("echo hi >> out.txt", 0).writes, 1);

        let copy = estimate_file_operations("cp a.txt b.txt", 0);
        assert_eq!(copy.reads, 1);
        assert_eq!(copy.writes, 1);
    }

    #[test]
    fn test_fd_duplication_is_not_a_write() {
        assert_eq!(estimate_file_operations("make 2>&1", 0).writes, 0);
    }

    #[test]
    fn test_chained_segments_accumulate() {
        let ops = estimate_file_operations("ls && cat a | sort > sorted.txt", 0);
        assert_eq!(ops.reads, 3);
        assert_eq!(ops.writes, 1);
    }

    #[test]
    fn test_full_path_verbs() {
        assert_eq!(estimate_file_operations("/bin/cat x", 0).reads, 1);
        assert_eq!(estimate_network_activity("/usr/bin/curl example.com", 0).requests, 1);
    }

    #[test]
    fn test_network_verbs() {
        assert_eq!(estimate_network_activity("curl https://example.com", 0).requests, 1);
        assert_eq!(estimate_network_activity("ls -la", 0).requests, 0);
        let ping = estimate_network_activity("ping -c 1 localhost", 0);
        assert_eq!(ping.bytes_transferred, BYTES_PER_REQUEST);
    }

    #[test]
    fn test_git_remote_subcommands_only() {
        assert_eq!(estimate_network_activity("git pull origin main", 0).requests, 1);
        assert_eq!(estimate_network_activity("git --no-pager fetch", 0).requests, 1);
        assert_eq!(estimate_network_activity("git status", 0).requests, 0);
    }

    #[test]
    fn test_parallel_invocations_counted() {
        let net = estimate_network_activity("wget a & wget b & curl c", 0);
        assert_eq!(net.requests, 3);
    }

    #[test]
    fn test_env_assignments_skipped() {
        assert_eq!(estimate_network_activity("HTTPS_PROXY=x curl y", 0).requests, 1);
    }

    #[test]
    fn test_read_bytes_follow_output() {
        let small = estimate_file_operations("cat README.md", 100);
        assert_eq!(small.bytes_read, BYTES_PER_FILE_OP);

        let large = estimate_file_operations("cat big.log", 1024 * 1024);
        assert_eq!(large.reads, 1);
        assert_eq!(large.bytes_read, 1024 * 1024);
        assert_eq!(large.bytes_written, 0);
    }

    #[test]
    fn test_output_without_reads_is_not_io() {
        let ops = estimate_file_operations("echo hello", 5000);
        assert_eq!(ops.reads, 0);
        assert_eq!(ops.bytes_read, 0);

        let net = estimate_network_activity("echo hello", 5000);
        assert_eq!(net.bytes_transferred, 0);
    }

    #[test]
    fn test_network_bytes_follow_output() {
        let quiet = estimate_network_activity("curl https://example.com/archive.tar", 0);
        let download =
            estimate_network_activity("curl https://example.com/archive.tar", 512 * 1024);

        assert_eq!(download.requests, 1);
        assert_eq!(quiet.bytes_transferred, BYTES_PER_REQUEST);
        assert_eq!(download.bytes_transferred, 512 * 1024);
    }
}
