mod common;

use tokrep_core::AnyEmptyResult;

#[test]
fn keys_lists_distinct_keys_in_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let template = tmp.path().join("template.txt");
	std::fs::write(&template, "{{ b }} {{a}}\n{{b}} {{c}}")?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("keys")
		.arg(&template)
		.arg("--key")
		.arg("trim")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("b\na\nc\n");

	Ok(())
}

#[test]
fn keys_json_output_reads_stdin() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("keys")
		.arg("--start")
		.arg("${")
		.arg("--end")
		.arg("}")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("${user} at ${host}, ${user}")
		.assert()
		.success()
		.stdout("[\"user\",\"host\"]\n");

	Ok(())
}

#[test]
fn keys_uses_configured_delimiters() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("tokrep.toml"),
		"[tokens]\nstart = \"<%\"\nend = \"%>\"\nkey = \"uppercase\"\n",
	)?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("keys")
		.arg("-")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("<%home%> {{ignored}}")
		.assert()
		.success()
		.stdout("HOME\n");

	Ok(())
}

#[test]
fn keys_rejects_unknown_key_normalizer() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::tokrep_cmd();
	cmd.arg("keys")
		.arg("--key")
		.arg("reverse")
		.arg("--path")
		.arg(tmp.path())
		.write_stdin("{{a}}")
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown key normalizer"));

	Ok(())
}
