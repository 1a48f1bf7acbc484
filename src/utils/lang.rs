use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Python,
    Java,
    C,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Javascript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::C => "c",
        }
    }

    /// Boilerplate shown in the editor before the student writes anything.
    pub fn starter_code(&self) -> &'static str {
        match self {
            Self::Java => {
                "public class Main {\n  public static void main(String[] args) {\n    // Write your solution here\n    System.out.println(\"Hello, World!\");\n  }\n}"
            }
            Self::Python => "# Write your solution here\nprint(\"Hello, World!\")",
            Self::C => {
                "#include <stdio.h>\nint main(){\n  // Write your solution here\n  printf(\"Hello, World!\\n\");\n  return 0;\n}"
            }
            Self::Javascript => "// Write your solution here\nconsole.log(\"Hello, World!\");",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
