//! Built-in risk tables and the context attached to each classification.

use serde::{Deserialize, Serialize};
use shellward_core::{CommandCategory, CommandContext};

/// Data-driven rule tables, one per tier.
///
/// Entries are case-insensitive substrings, or regexes when they begin with
/// `^`. `always_block` entries are plain substrings regardless of shape and
/// are checked before the `blocked` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    /// Configured always-block substrings.
    pub always_block: Vec<String>,
    /// Irreversible or destructive commands.
    pub blocked: Vec<String>,
    /// Privileged or system-altering commands.
    pub dangerous: Vec<String>,
    /// Read-only, informational commands.
    pub safe: Vec<String>,
    /// Commands that change workspace state.
    pub risky: Vec<String>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryRules {
    /// The built-in tables.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            always_block: Vec::new(),
            blocked: to_owned(BLOCKED),
            dangerous: to_owned(DANGEROUS),
            safe: to_owned(SAFE),
            risky: to_owned(RISKY),
        }
    }

    /// Tables with no entries; everything classifies as Risky.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            always_block: Vec::new(),
            blocked: Vec::new(),
            dangerous: Vec::new(),
            safe: Vec::new(),
            risky: Vec::new(),
        }
    }

    /// Append entries to one tier's table.
    #[must_use]
    pub fn with_extra(
        mut self,
        category: CommandCategory,
        patterns: impl IntoIterator<Item = String>,
    ) -> Self {
        let table = match category {
            CommandCategory::Blocked => &mut self.blocked,
            CommandCategory::Dangerous => &mut self.dangerous,
            CommandCategory::Safe => &mut self.safe,
            CommandCategory::Risky => &mut self.risky,
        };
        table.extend(patterns);
        self
    }

    /// Add always-block substrings.
    #[must_use]
    pub fn with_always_block(mut self, patterns: impl IntoIterator<Item = String>) -> Self {
        self.always_block.extend(patterns);
        self
    }
}

fn to_owned(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| (*e).to_owned()).collect()
}

/// Irreversible damage to the system or its data.
pub const BLOCKED: &[&str] = &[
    "rm -rf /",
    "rm -fr /",
    "rm -rf ~",
    "rm -rf *",
    "dd if=",
    "of=/dev/sd",
    "of=/dev/nvme",
    "of=/dev/hd",
    "> /dev/sd",
    "mkfs",
    "fdisk",
    ":(){ :|:& };:",
    "chmod -r 777 /",
    "format c:",
    r"^(shutdown|reboot|halt|poweroff|init\s+0)\b",
    r"^(curl|wget)\b.*\|\s*(sudo\s+)?(ba|z)?sh\b",
];

/// Privilege escalation, permissions, processes and system services.
pub const DANGEROUS: &[&str] = &[
    r"^sudo\b",
    r"^su\b",
    r"^doas\b",
    "chmod",
    "chown",
    r"^(kill|killall|pkill)\b",
    r"^(systemctl|service|launchctl)\b",
    r"^(mount|umount)\b",
    r"^(apt|apt-get|yum|dnf|pacman|zypper)\b",
    r"^rm\s+-[a-z]*r",
    r"^crontab\b",
    r"^iptables\b",
    "git push --force",
    "git push -f",
    "git reset --hard",
    "git clean -f",
    "-delete",
    "-exec rm",
    "npm publish",
    "cargo publish",
];

/// Read-only inspection.
pub const SAFE: &[&str] = &[
    r"^ls\b",
    r"^pwd$",
    r"^cat\b",
    r"^echo\b",
    r"^(head|tail|less|more)\b",
    r"^(grep|rg|ag)\b",
    r"^wc\b",
    r"^find\b",
    r"^tree\b",
    r"^(file|stat|du|df)\b",
    r"^(which|whereis|type)\b",
    r"^(whoami|hostname|uname|date|env)\b",
    r"^git (status|log|diff|show|branch|remote)\b",
    r"^cargo (check|clippy|tree|metadata)\b",
    r"^(npm|yarn|pnpm) (list|ls|view|outdated)\b",
    r"^[a-z0-9_.-]+ (--version|-v|--help)$",
];

/// Workspace mutations.
pub const RISKY: &[&str] = &[
    r"^mkdir\b",
    r"^touch\b",
    r"^(cp|mv|ln)\b",
    r"^(rm|rmdir)\b",
    r"^sed\b",
    r"^(tar|zip|unzip|gzip|gunzip)\b",
    r"^git\b",
    r"^(npm|npx|yarn|pnpm|pip|pip3|cargo|go|make)\b",
    r"^(curl|wget)\b",
    r"^docker\b",
];

/// Operation type inferred from the leading words of a command.
pub(crate) fn operation_type(command: &str) -> &'static str {
    let mut words = command.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let verb = verb.rsplit('/').next().unwrap_or(verb);
    match verb {
        "sudo" | "su" | "doas" => "privilege_escalation",
        "rm" | "rmdir" | "shred" | "unlink" => "file_delete",
        "ls" | "cat" | "head" | "tail" | "less" | "more" | "grep" | "rg" | "ag" | "wc"
        | "find" | "tree" | "file" | "stat" | "du" | "df" | "pwd" | "echo" => "file_read",
        "mkdir" | "touch" | "cp" | "mv" | "ln" | "sed" | "tar" | "zip" | "unzip" | "gzip"
        | "gunzip" => "file_write",
        "chmod" | "chown" => "permission_change",
        "kill" | "killall" | "pkill" => "process_control",
        "systemctl" | "service" | "launchctl" | "shutdown" | "reboot" | "halt"
        | "poweroff" | "init" | "crontab" | "mount" | "umount" | "iptables" => "system_admin",
        "dd" | "mkfs" | "fdisk" | "format" => "disk_operation",
        "curl" | "wget" | "ssh" | "scp" | "rsync" | "ping" => "network",
        "apt" | "apt-get" | "yum" | "dnf" | "pacman" | "zypper" | "npm" | "npx" | "yarn"
        | "pnpm" | "pip" | "pip3" => "package_management",
        "git" => "version_control",
        "cargo" | "go" | "make" | "docker" => "build",
        _ if verb.starts_with("mkfs") => "disk_operation",
        _ => "unknown",
    }
}

/// Context for a classification: what the command does, what it can
/// affect, and safer ways to get the same result.
pub(crate) fn context_for(category: CommandCategory, command: &str) -> CommandContext {
    let operation = operation_type(command);
    let impact = match category {
        CommandCategory::Safe => "read-only; no lasting changes",
        CommandCategory::Risky => "modifies files or state inside the workspace",
        CommandCategory::Dangerous => {
            "can change system state, permissions or processes beyond the workspace"
        },
        CommandCategory::Blocked => "can cause irreversible damage to the system or its data",
    };

    let mut context = CommandContext::new(operation, impact);
    if category == CommandCategory::Safe {
        return context;
    }

    for alternative in alternatives(operation, command) {
        context = context.with_alternative(*alternative);
    }
    context
}

fn alternatives(operation: &str, command: &str) -> &'static [&'static str] {
    match operation {
        "file_delete" => &[
            "list the target first to confirm what will be removed",
            "move files into a scratch directory inside the workspace instead of deleting",
        ],
        "privilege_escalation" => &["run the command without elevated privileges"],
        "permission_change" => &["change permissions only on files inside the workspace"],
        "disk_operation" => &["operate on an image file inside the workspace"],
        "network" => &["download to a file and inspect it before running anything"],
        "version_control" if command.contains("--force") || command.contains(" -f") => {
            &["use git push --force-with-lease", "create a new commit instead"]
        },
        "version_control" if command.contains("reset --hard") => {
            &["use git stash to keep local changes"]
        },
        "system_admin" | "process_control" => &["ask the user to perform this step manually"],
        _ => &[],
    }
}
