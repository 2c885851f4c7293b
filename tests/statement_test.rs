mod common;
use common::*;

#[test]
fn test_print_zones() {
    let out = run(&["10 FOR I=1 TO 3", "20 PRINT I,", "30 NEXT I", "RUN"]);
    // Columns 0, 14, and 28: each number lands at the next 14-column zone.
    let pad = " ".repeat(11);
    let expected = format!(" 1 {} 2 {} 3 {}\n", pad, pad, pad);
    assert_eq!(out, expected);
}

#[test]
fn test_gosub_return_nesting() {
    let out = run(&[
        "10 GOSUB 100",
        r#"20 PRINT "B""#,
        "30 END",
        "100 GOSUB 200 : RETURN",
        r#"200 PRINT "A" : RETURN"#,
        "RUN",
    ]);
    assert_eq!(out, "A\nB\n");
}

#[test]
fn test_for_skip_when_start_past_end() {
    let out = run(&[
        "10 FOR I=5 TO 1 : PRINT I : NEXT I",
        r#"20 PRINT "DONE""#,
        "RUN",
    ]);
    assert_eq!(out, "DONE\n");
}

#[test]
fn test_string_arithmetic_error() {
    let out = run(&[r#"PRINT "A"+"B""#]);
    assert_eq!(out, "TYPE MISMATCH\n");
}

#[test]
fn test_read_data_restore() {
    let out = run(&[
        "10 DATA 1,2,3",
        "20 READ A,B : RESTORE : READ C",
        "30 PRINT A;B;C",
        "RUN",
    ]);
    assert_eq!(out, " 1  2  1 \n");
}

#[test]
fn test_goto_terminates_loop() {
    let out = run(&[
        "10 FOR I=1 TO 10",
        "20 IF I=3 THEN 50",
        "30 NEXT I",
        "50 NEXT I",
        "RUN",
    ]);
    assert_eq!(out, "NEXT WITHOUT FOR\n");
}

#[test]
fn test_breaking_out_of_loop_with_goto() {
    let out = run(&[
        "10 FOR Y=1 TO 2",
        "20 FOR X=8 TO 9",
        "30 PRINT Y;X",
        "40 GOTO 60",
        "50 NEXT X",
        "60 NEXT Y",
        "RUN",
    ]);
    assert_eq!(out, " 1  8 \n 2  8 \n");
}

#[test]
fn test_for_step_negative() {
    let out = run(&["10 FOR I=3 TO 1 STEP -1", "20 PRINT I;", "30 NEXT", "RUN"]);
    assert_eq!(out, " 3  2  1 \n");
}

#[test]
fn test_for_next_same_line() {
    let out = run(&["10 FOR I=1 TO 3 : PRINT I; : NEXT I", "20 END", "RUN"]);
    assert_eq!(out, " 1  2  3 \n");
}

#[test]
fn test_for_next_empty_body() {
    let out = run(&["10 FOR I=1 TO 5 : NEXT", "20 PRINT I", "RUN"]);
    assert_eq!(out, " 6 \n");
}

#[test]
fn test_next_wrong_variable() {
    let out = run(&["10 FOR I=1 TO 2", "20 NEXT J", "RUN"]);
    assert_eq!(out, "NEXT WITHOUT FOR\n");
}

#[test]
fn test_return_without_gosub() {
    let out = run(&["10 RETURN", "RUN"]);
    assert_eq!(out, "RETURN WITHOUT GOSUB\n");
}

#[test]
fn test_out_of_data() {
    let out = run(&["10 READ A", "RUN"]);
    assert_eq!(out, "OUT OF DATA\n");
}

#[test]
fn test_read_strings_and_arrays() {
    let out = run(&[
        r#"10 DATA 5,HELLO,"A B""#,
        "20 READ A(3),B$,C$",
        "30 PRINT A(3);B$;C$",
        "RUN",
    ]);
    assert_eq!(out, " 5 HELLOA B\n");
}

#[test]
fn test_read_unparseable_number() {
    let out = run(&["10 DATA FOO", "20 READ A", "RUN"]);
    assert_eq!(out, "SYNTAX ERROR\n");
}

#[test]
fn test_on_goto() {
    let out = run(&[
        "10 ON 2 GOTO 100,200",
        r#"100 PRINT "ONE" : END"#,
        r#"200 PRINT "TWO" : END"#,
        "RUN",
    ]);
    assert_eq!(out, "TWO\n");
}

#[test]
fn test_on_gosub_returns_after_on() {
    let out = run(&[
        r#"10 ON 1 GOSUB 100 : PRINT "AFTER""#,
        "20 END",
        r#"100 PRINT "SUB" : RETURN"#,
        "RUN",
    ]);
    assert_eq!(out, "SUB\nAFTER\n");
}

#[test]
fn test_on_out_of_range_is_noop() {
    let out = run(&["10 ON 5 GOTO 100", r#"20 PRINT "SKIP""#, "RUN"]);
    assert_eq!(out, "SKIP\n");
}

#[test]
fn test_if_owns_rest_of_line() {
    let out = run(&[
        r#"10 IF 0 THEN PRINT "A" : PRINT "B""#,
        r#"20 IF 1 THEN PRINT "C" : PRINT "D""#,
        "RUN",
    ]);
    assert_eq!(out, "C\nD\n");
}

#[test]
fn test_stop_reports_break() {
    let out = run(&[r#"10 PRINT "X""#, "20 STOP", r#"30 PRINT "Y""#, "RUN"]);
    assert_eq!(out, "X\nBREAK IN 20\n");
}

#[test]
fn test_end_is_silent() {
    let out = run(&[r#"10 PRINT "X""#, "20 END", r#"30 PRINT "Y""#, "RUN"]);
    assert_eq!(out, "X\n");
}

#[test]
fn test_def_fn_and_global_parameter() {
    let (mut runtime, output) = runtime();
    let out = enter(
        &mut runtime,
        &output,
        &["10 DEF FNS(X)=X*X", "20 PRINT FNS(3)", "RUN"],
    );
    assert_eq!(out, " 9 \n");
    // The parameter is a plain global and keeps its last value.
    let out = enter(&mut runtime, &output, &["PRINT X"]);
    assert_eq!(out, " 3 \n");
}

#[test]
fn test_undefined_user_function() {
    let out = run(&["PRINT FNA(1)"]);
    assert_eq!(out, "UNDEFINED FUNCTION\n");
}

#[test]
fn test_list_reproduces_program() {
    let out = run(&[r#"20 print "b""#, "10 end", "LIST"]);
    assert_eq!(out, "10 END\n20 PRINT \"b\"\n");
}

#[test]
fn test_line_replace_and_delete() {
    let (mut runtime, output) = runtime();
    let out = enter(
        &mut runtime,
        &output,
        &[r#"10 PRINT "A""#, r#"10 PRINT "B""#, "LIST"],
    );
    assert_eq!(out, "10 PRINT \"B\"\n");
    let out = enter(&mut runtime, &output, &["10", "LIST"]);
    assert_eq!(out, "");
}

#[test]
fn test_new_clears_everything() {
    let (mut runtime, output) = runtime();
    enter(&mut runtime, &output, &["10 A=1", "20 PRINT A", "RUN", "NEW"]);
    let out = enter(&mut runtime, &output, &["LIST"]);
    assert_eq!(out, "");
    let out = enter(&mut runtime, &output, &["PRINT A"]);
    assert_eq!(out, " 0 \n");
}

#[test]
fn test_clear_wipes_variables_only() {
    let (mut runtime, output) = runtime();
    enter(&mut runtime, &output, &["10 END", "A=5", "CLEAR"]);
    let out = enter(&mut runtime, &output, &["PRINT A"]);
    assert_eq!(out, " 0 \n");
    let out = enter(&mut runtime, &output, &["LIST"]);
    assert_eq!(out, "10 END\n");
}

#[test]
fn test_run_clears_variables() {
    let (mut runtime, output) = runtime();
    enter(&mut runtime, &output, &["A=7"]);
    let out = enter(&mut runtime, &output, &["10 PRINT A", "RUN"]);
    assert_eq!(out, " 0 \n");
}

#[test]
fn test_goto_direct_starts_program() {
    let out = run(&[r#"10 PRINT "A""#, r#"20 PRINT "B""#, "GOTO 20"]);
    assert_eq!(out, "B\n");
}

#[test]
fn test_goto_undefined_line() {
    let out = run(&["GOTO 100"]);
    assert_eq!(out, "UNDEFINED LINE NUMBER\n");
}

#[test]
fn test_illegal_line_number() {
    let out = run(&["70000 PRINT"]);
    assert_eq!(out, "ILLEGAL LINE NUMBER\n");
}

#[test]
fn test_rem_is_ignored() {
    let out = run(&[
        "10 REM this: is all comment, even : colons",
        r#"20 PRINT "OUT""#,
        "RUN",
    ]);
    assert_eq!(out, "OUT\n");
}

#[test]
fn test_print_trailing_semicolon_joins_lines() {
    let out = run(&[r#"10 PRINT "A";"#, r#"20 PRINT "B""#, "RUN"]);
    assert_eq!(out, "AB\n");
}

#[test]
fn test_print_tab() {
    let out = run(&[r#"10 PRINT TAB(5);"X""#, "RUN"]);
    assert_eq!(out, "    X\n");
}

#[test]
fn test_print_tab_never_moves_back() {
    let out = run(&[r#"10 PRINT "ABCDEF";TAB(3);"X""#, "RUN"]);
    assert_eq!(out, "ABCDEFX\n");
}
