use super::types::{FileChange, FileStatus};
use super::HostError;

/// Parse a unified diff (as served by GitHub's diff media type) into one
/// FileChange per file section.
///
/// Each file section starts with:
///   diff --git a/{path} b/{path}
///
/// Extended headers set the status:
///   `new file mode` / `--- /dev/null`      -> Added
///   `deleted file mode` / `+++ /dev/null`  -> Deleted
///   `rename from` / `rename to`            -> Renamed
///
/// Hunks start with `@@ -{old_start},{old_count} +{new_start},{new_count} @@`
/// and are kept verbatim as the file's patch text.
pub fn parse_diff(raw_diff: &str) -> Result<Vec<FileChange>, HostError> {
    if raw_diff.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut current: Option<FileChange> = None;
    let mut patch_lines: Vec<&str> = Vec::new();

    for line in raw_diff.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            finish_file(&mut files, &mut current, &mut patch_lines);
            let path = header_path(rest)?;
            current = Some(FileChange {
                path,
                status: FileStatus::Modified,
                additions: 0,
                deletions: 0,
                patch: None,
            });
            continue;
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if line.starts_with("@@") {
            validate_hunk_header(line)?;
            patch_lines.push(line);
            continue;
        }

        // Extended headers only appear before the first hunk.
        if patch_lines.is_empty() {
            if line.starts_with("new file mode") {
                file.status = FileStatus::Added;
            } else if line.starts_with("deleted file mode") {
                file.status = FileStatus::Deleted;
            } else if let Some(to) = line.strip_prefix("rename to ") {
                file.status = FileStatus::Renamed;
                file.path = to.trim().to_string();
            } else if line.starts_with("rename from ") {
                file.status = FileStatus::Renamed;
            } else if let Some(path) = line.strip_prefix("--- ") {
                if path.trim() == "/dev/null" {
                    file.status = FileStatus::Added;
                }
            } else if let Some(path) = line.strip_prefix("+++ ") {
                let path = path.trim_end_matches('\t');
                if path.trim() == "/dev/null" {
                    file.status = FileStatus::Deleted;
                } else if let Some(path) = path.strip_prefix("b/") {
                    file.path = path.to_string();
                }
            }
            continue;
        }

        if line.starts_with('+') {
            file.additions += 1;
            patch_lines.push(line);
        } else if line.starts_with('-') {
            file.deletions += 1;
            patch_lines.push(line);
        } else if line.starts_with(' ') || line.starts_with('\\') {
            patch_lines.push(line);
        }
    }

    finish_file(&mut files, &mut current, &mut patch_lines);
    Ok(files)
}

/// Path from the `a/{path} b/{path}` part of a `diff --git` header.
/// Paths may contain spaces, so split on the ` b/` separator rather than on
/// whitespace. The `+++ b/{path}` line, when present, overrides this.
fn header_path(rest: &str) -> Result<String, HostError> {
    if let Some((_, b_path)) = rest.rsplit_once(" b/") {
        return Ok(b_path.to_string());
    }
    rest.strip_prefix("a/")
        .map(str::to_string)
        .ok_or_else(|| HostError::DiffParse(format!("Missing b/ path in diff header: {rest}")))
}

fn finish_file(
    files: &mut Vec<FileChange>,
    current: &mut Option<FileChange>,
    lines: &mut Vec<&str>,
) {
    if let Some(mut file) = current.take() {
        if !lines.is_empty() {
            file.patch = Some(lines.join("\n"));
        }
        files.push(file);
    }
    lines.clear();
}

fn validate_hunk_header(line: &str) -> Result<(), HostError> {
    let header = line
        .trim()
        .strip_prefix("@@")
        .ok_or_else(|| HostError::DiffParse("Invalid hunk header".to_string()))?;
    // Drop the optional section heading after the closing @@
    let header = header.split("@@").next().unwrap_or_default().trim();
    let mut parts = header.split_whitespace();
    let old_part = parts
        .next()
        .ok_or_else(|| HostError::DiffParse("Missing old range".to_string()))?;
    let new_part = parts
        .next()
        .ok_or_else(|| HostError::DiffParse("Missing new range".to_string()))?;

    validate_range(old_part, '-')?;
    validate_range(new_part, '+')
}

fn validate_range(part: &str, prefix: char) -> Result<(), HostError> {
    let range = part
        .strip_prefix(prefix)
        .ok_or_else(|| HostError::DiffParse("Invalid range prefix".to_string()))?;
    let (start_str, count_str) = match range.split_once(',') {
        Some((start, count)) => (start, count),
        None => (range, "1"),
    };
    start_str
        .parse::<usize>()
        .map_err(|_| HostError::DiffParse(format!("Invalid range start in {}", part)))?;
    count_str
        .parse::<usize>()
        .map_err(|_| HostError::DiffParse(format!("Invalid range count in {}", part)))?;
    Ok(())
}
