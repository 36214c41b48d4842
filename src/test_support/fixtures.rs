//! Test fixtures for common dependency graphs.

use super::TestProject;

/// `LibA` (static library exporting `include`) and `App` linking it, both in
/// one group manifest.
pub fn lib_and_app() -> TestProject {
    TestProject::new()
        .manifest(
            "CppBuild.toml",
            r#"
[[target]]
name = "LibA"
type = "static-library"
files = ["liba/a.cpp"]
includeDirectories = { public = ["include"] }

[[target]]
name = "App"
files = ["app/main.cpp"]
link = ["LibA"]
"#,
        )
        .file("liba/a.cpp", "int a() { return 1; }\n")
        .file("include/a.h", "int a();\n")
        .file("app/main.cpp", "#include \"a.h\"\nint main() { return a(); }\n")
}

/// Diamond: `A` links `B` and `C`, both of which link `D`.
pub fn diamond() -> TestProject {
    TestProject::new().manifest(
        "CppBuild.toml",
        r#"
[[target]]
name = "A"
files = ["a.c"]
link = ["B", "C"]

[[target]]
name = "B"
type = "static-library"
files = ["b.c"]
link = ["D"]

[[target]]
name = "C"
type = "static-library"
files = ["c.c"]
link = ["D"]

[[target]]
name = "D"
type = "static-library"
files = ["d.c"]
includeDirectories = { public = ["d/include"] }
"#,
    )
}

/// Three-cycle: `A -> B -> C -> A`.
pub fn cycle3() -> TestProject {
    TestProject::new().manifest(
        "CppBuild.toml",
        r#"
[[target]]
name = "A"
link = ["B"]

[[target]]
name = "B"
link = ["C"]

[[target]]
name = "C"
link = ["A"]
"#,
    )
}

/// App in the root manifest linking a library declared in `libs/core`.
pub fn cross_manifest() -> TestProject {
    TestProject::new()
        .manifest(
            "libs/core/CppBuild.toml",
            r#"
name = "core"
type = "static-library"
files = ["src/core.c"]
includeDirectories = { public = ["include"], private = ["src"] }
definitions = { interface = ["USE_CORE"] }
"#,
        )
        .manifest(
            "CppBuild.toml",
            r#"
name = "app"
files = ["main.c"]
link = [{ name = "core", src = "libs/core" }, { name = "pthread", system = true }]
"#,
        )
}
