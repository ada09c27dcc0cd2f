use todoshare::output::{format_human, infer_command_name, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("todoshare share add: category #3 shared with bob@example.com");
    human.push_summary("permission", "write");
    human.push_detail("Bob <bob@example.com>: write");
    human.push_warning("its todos and shares were removed as well");
    human.push_next_step("todoshare share list 3");

    let rendered = format_human(&human);
    assert!(rendered.contains("todoshare share add: category #3 shared with bob@example.com"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- permission: write"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- Bob <bob@example.com>: write"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- todoshare share list 3"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("Board for alice@example.com");
    assert_eq!(format_human(&human), "Board for alice@example.com");
}

#[test]
fn command_name_skips_global_flag_values() {
    let args = ["--json", "--user", "7", "category", "tasks", "4"]
        .iter()
        .map(|s| s.to_string());
    assert_eq!(infer_command_name(args), "category tasks");
}
