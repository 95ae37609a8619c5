mod common;

use rstest::rstest;
use similar_asserts::assert_eq;
use tokrep_cli::parse_assignment;
use tokrep_core::AnyEmptyResult;
use tokrep_core::TokrepError;

#[test]
fn render_replaces_tokens_from_assignments() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let template = tmp.path().join("greeting.txt");
	std::fs::write(&template, "Hello {{name}}! {{missing}}")?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg(&template)
		.arg("--set")
		.arg("name=World")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("Hello World! ");

	Ok(())
}

#[test]
fn render_reads_stdin_with_custom_delimiters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--start")
		.arg("${")
		.arg("--end")
		.arg("}")
		.arg("-s")
		.arg("x=1")
		.arg("-s")
		.arg("y=a=b")
		.arg("--default")
		.arg("?")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("A${x}B${y}C${z}")
		.assert()
		.success()
		.stdout("A1Ba=bC?");

	Ok(())
}

#[test]
fn render_uses_config_tokens_and_data() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("package.json"),
		r#"{"name": "demo", "version": "1.0.0", "keywords": ["a", "b"]}"#,
	)?;
	std::fs::write(
		tmp.path().join("tokrep.toml"),
		"[tokens]\nstart = \"${\"\nend = \"}\"\ndefault = \"N/A\"\nkey = \"trim\"\n\n[data]\npkg \
		 = \"package.json\"\n",
	)?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("${ pkg.name }@${pkg.version} ${pkg.keywords.1} ${pkg.license}")
		.assert()
		.success()
		.stdout("demo@1.0.0 b N/A");

	Ok(())
}

#[test]
fn render_later_sources_override_earlier_ones() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let first = tmp.path().join("first.yaml");
	let second = tmp.path().join("second.toml");
	std::fs::write(&first, "a: first\nb: first\nc: first\n")?;
	std::fs::write(&second, "b = \"second\"\nc = \"second\"\n")?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--data")
		.arg(&first)
		.arg("-d")
		.arg(&second)
		.arg("--set")
		.arg("c=set")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("{{a}} {{b}} {{c}}")
		.assert()
		.success()
		.stdout("first second set");

	Ok(())
}

#[test]
fn render_writes_output_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let output = tmp.path().join("out.txt");

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--set")
		.arg("v=2")
		.arg("--output")
		.arg(&output)
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("version {{v}}\n")
		.assert()
		.success()
		.stdout("");

	assert_eq!(std::fs::read_to_string(&output)?, "version 2\n");

	Ok(())
}

#[test]
fn render_strict_fails_on_missing_key() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--strict")
		.arg("--set")
		.arg("present=1")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("{{present}} {{absent}}")
		.assert()
		.code(1)
		.stdout("")
		.stderr(predicates::str::contains("no value found for key `absent`"));

	Ok(())
}

#[test]
fn render_rejects_empty_delimiter() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--end=")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("{{a}}")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("must not be empty"));

	Ok(())
}

#[test]
fn render_rejects_non_object_data_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let data = tmp.path().join("list.json");
	std::fs::write(&data, "[1, 2, 3]")?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--data")
		.arg(&data)
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("{{0}}")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to load data file"));

	Ok(())
}

#[test]
fn render_reports_non_stringable_value() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("data.json"), r#"{"pkg": {"name": "demo"}}"#)?;
	std::fs::write(tmp.path().join("tokrep.toml"), "[data]\nd = \"data.json\"\n")?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("{{d.pkg}}")
		.assert()
		.code(2)
		.stdout("")
		.stderr(predicates::str::contains("could not replace token with key `d.pkg`"));

	Ok(())
}

#[test]
fn render_rejects_malformed_assignment() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("render")
		.arg("--set")
		.arg("novalue")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("{{a}}")
		.assert()
		.failure()
		.stderr(predicates::str::contains("invalid assignment"));

	Ok(())
}

#[rstest]
#[case::simple("a=1", "a", "1")]
#[case::empty_value("a=", "a", "")]
#[case::equals_in_value("url=x=y", "url", "x=y")]
#[case::dotted_key("pkg.version=2", "pkg.version", "2")]
fn parses_assignments(#[case] input: &str, #[case] key: &str, #[case] value: &str) -> AnyEmptyResult {
	let (parsed_key, parsed_value) = parse_assignment(input)?;
	assert_eq!(parsed_key, key);
	assert_eq!(parsed_value, value);

	Ok(())
}

#[rstest]
#[case::no_separator("novalue")]
#[case::empty_key("=value")]
fn rejects_invalid_assignments(#[case] input: &str) {
	let result = parse_assignment(input);
	assert!(matches!(result, Err(TokrepError::InvalidAssignment(ref raw)) if raw == input));
}
