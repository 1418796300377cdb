/// Reference vocabulary of common technical skill keywords used to
/// approximate a posting's required-skill set when it does not enumerate
/// requirements in a structured way.
pub(crate) const COMMON_SKILLS: &[&str] = &[
    "javascript",
    "typescript",
    "python",
    "java",
    "react",
    "angular",
    "vue",
    "node",
    "express",
    "django",
    "flask",
    "spring",
    "sql",
    "mongodb",
    "postgresql",
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "git",
    "agile",
    "scrum",
];
