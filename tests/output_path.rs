//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::path::{Path, PathBuf};

    use paper_translator::core::format_output_path;

    #[test]
    fn default_beside_pdf() {
        let final_destination =
            format_output_path(Path::new("/home/username/papers/attention.pdf"), None, "json");

        assert_eq!(
            final_destination,
            PathBuf::from("/home/username/papers/attention.translated.json")
        );
    }

    #[test]
    fn strips_content_list_suffix() {
        let final_destination = format_output_path(
            Path::new("/tmp/out/attention_content_list.json"),
            None,
            "md",
        );

        assert_eq!(final_destination, PathBuf::from("/tmp/out/attention.translated.md"));
    }

    #[test]
    fn explicit_as_is() {
        let final_destination = format_output_path(
            Path::new("attention.pdf"),
            Some("/home/username/result.json"),
            "json",
        );

        assert_eq!(final_destination, PathBuf::from("/home/username/result.json"));
    }

    #[test]
    fn substitute_stem() {
        let final_destination = format_output_path(
            Path::new("/data/attention_content_list.json"),
            Some("/srv/%stem%/%stem%.ko.json"),
            "json",
        );

        assert_eq!(
            final_destination,
            PathBuf::from("/srv/attention/attention.ko.json")
        );
    }

    #[test]
    fn substitute_extension() {
        let final_destination =
            format_output_path(Path::new("paper.pdf"), Some("out/%stem%.%extension%"), "md");

        assert_eq!(final_destination, PathBuf::from("out/paper.md"));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use std::path::{Path, PathBuf};

    use paper_translator::core::format_output_path;

    #[test]
    fn bare_content_list_name() {
        let final_destination = format_output_path(Path::new("_content_list.json"), None, "json");

        assert_eq!(final_destination, PathBuf::from("paper.translated.json"));
    }

    #[test]
    fn unknown_placeholder_kept() {
        let final_destination =
            format_output_path(Path::new("paper.pdf"), Some("%title%.json"), "json");

        assert_eq!(final_destination, PathBuf::from("%title%.json"));
    }
}
