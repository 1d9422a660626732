//! Runtime support files shipped next to the generated bindings.
//!
//! Written once per run when `generate_support_files` is set, so generated
//! C includes can use the quoted form.

use std::path::PathBuf;

use crate::config::Target;
use crate::emit::GeneratedFile;
use crate::ident::C_RUNTIME_HEADER;

const C_HEADER: &str = include_str!("../support/bnd_embed.h");

const JAVA_FILES: &[(&str, &str)] = &[
    ("Ref.java", include_str!("../support/java/bnd/embed/Ref.java")),
    ("Out.java", include_str!("../support/java/bnd/embed/Out.java")),
    ("Runtime.java", include_str!("../support/java/bnd/embed/Runtime.java")),
    ("UnsignedByte.java", include_str!("../support/java/bnd/embed/UnsignedByte.java")),
    ("UnsignedShort.java", include_str!("../support/java/bnd/embed/UnsignedShort.java")),
    ("UnsignedInt.java", include_str!("../support/java/bnd/embed/UnsignedInt.java")),
    ("UnsignedLong.java", include_str!("../support/java/bnd/embed/UnsignedLong.java")),
];

pub fn support_files(targets: &[Target]) -> Vec<GeneratedFile> {
    let mut files = Vec::new();
    if targets.contains(&Target::C) {
        files.push(GeneratedFile {
            path: PathBuf::from(C_RUNTIME_HEADER),
            contents: C_HEADER.to_string(),
        });
    }
    if targets.contains(&Target::Java) {
        for (name, contents) in JAVA_FILES {
            files.push(GeneratedFile {
                path: ["bnd", "embed", name].iter().collect(),
                contents: contents.to_string(),
            });
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_files_follow_targets() {
        let c_only = support_files(&[Target::C]);
        assert_eq!(c_only.len(), 1);
        assert_eq!(c_only[0].path, PathBuf::from("bnd_embed.h"));

        let java = support_files(&[Target::Java]);
        assert!(java.iter().all(|f| f.path.starts_with("bnd/embed")));
        assert!(java.iter().any(|f| f.contents.contains("public static void checkExceptions()")));
    }
}
