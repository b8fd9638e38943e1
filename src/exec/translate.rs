//! Translation of common POSIX commands into PowerShell equivalents.
//!
//! Matching is on the exact lowercased leading token only. Unknown commands
//! pass through unchanged, so the caller can always feed the result to the
//! native backend. Known commands with missing required arguments translate
//! into a `Write-Host` that prints a usage message, mirroring what the
//! original command would complain about.

/// Whether `command`'s leading token has a PowerShell translation.
pub fn is_translatable(command: &str) -> bool {
    let token = leading_token(command);
    TRANSLATORS.iter().any(|(name, _)| *name == token)
}

/// Translate `command` to PowerShell. Identity for unknown commands.
pub fn translate(command: &str) -> String {
    let token = leading_token(command);
    let args: Vec<&str> = command.split_whitespace().skip(1).collect();
    match TRANSLATORS.iter().find(|(name, _)| *name == token) {
        Some((_, build)) => build(&args),
        None => command.to_string(),
    }
}

fn leading_token(command: &str) -> String {
    command
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

type Translator = fn(&[&str]) -> String;

static TRANSLATORS: &[(&str, Translator)] = &[
    ("ls", |_| "Get-ChildItem".to_string()),
    ("pwd", |_| "Get-Location".to_string()),
    ("cat", |args| match args.first() {
        Some(file) => format!("Get-Content \"{file}\""),
        None => "Write-Host \"cat: missing file name\"".to_string(),
    }),
    ("head", |args| match args.last() {
        Some(file) => format!("Get-Content \"{file}\" | Select-Object -First 10"),
        None => "Write-Host \"head: missing file name\"".to_string(),
    }),
    ("tail", |args| match args.last() {
        Some(file) => format!("Get-Content \"{file}\" | Select-Object -Last 10"),
        None => "Write-Host \"tail: missing file name\"".to_string(),
    }),
    ("touch", |args| match args.first() {
        Some(file) => format!(
            "if (Test-Path \"{file}\") {{ (Get-Item \"{file}\").LastWriteTime = Get-Date }} \
             else {{ New-Item -ItemType File \"{file}\" | Out-Null }}"
        ),
        None => "Write-Host \"touch: missing file name\"".to_string(),
    }),
    ("mkdir", |args| match args.first() {
        Some(dir) => format!("New-Item -ItemType Directory \"{dir}\" -Force"),
        None => "Write-Host \"mkdir: missing directory name\"".to_string(),
    }),
    ("rm", |args| match args.first() {
        Some(target) => format!("Remove-Item \"{target}\" -Force"),
        None => "Write-Host \"rm: missing target\"".to_string(),
    }),
    ("cp", |args| match (args.first(), args.get(1)) {
        (Some(src), Some(dst)) => format!("Copy-Item \"{src}\" \"{dst}\""),
        _ => "Write-Host \"cp: need source and destination\"".to_string(),
    }),
    ("mv", |args| match (args.first(), args.get(1)) {
        (Some(src), Some(dst)) => format!("Move-Item \"{src}\" \"{dst}\""),
        _ => "Write-Host \"mv: need source and destination\"".to_string(),
    }),
    ("echo", |args| {
        if args.is_empty() {
            "Write-Output \"\"".to_string()
        } else {
            format!("Write-Output {}", args.join(" "))
        }
    }),
    ("clear", |_| "Clear-Host".to_string()),
    ("ps", |_| {
        "Get-Process | Select-Object ProcessName,Id,CPU".to_string()
    }),
    ("kill", |args| match args.first() {
        Some(pid) => format!("Stop-Process -Id {pid} -Force"),
        None => "Write-Host \"kill: missing process id\"".to_string(),
    }),
    ("grep", |args| {
        if args.is_empty() {
            "Write-Host \"grep: missing pattern\"".to_string()
        } else {
            format!("Select-String {}", args.join(" "))
        }
    }),
    ("find", |args| {
        let path = args.first().copied().unwrap_or(".");
        format!("Get-ChildItem -Path \"{path}\" -Recurse")
    }),
    ("df", |_| "Get-PSDrive -PSProvider FileSystem".to_string()),
    ("whoami", |_| "$env:USERNAME".to_string()),
    ("hostname", |_| "$env:COMPUTERNAME".to_string()),
    ("date", |_| "Get-Date".to_string()),
    ("wc", |args| match args.first() {
        Some(file) => {
            format!("Get-Content \"{file}\" | Measure-Object -Line -Word -Character")
        }
        None => "Write-Host \"wc: missing file name\"".to_string(),
    }),
];
