mod common;
use common::*;

#[test]
fn test_auto_dimension_on_first_access() {
    assert_eq!(run(&["PRINT A(5)"]), " 0 \n");
    assert_eq!(run(&["A(10)=1 : PRINT A(10)"]), " 1 \n");
    assert_eq!(run(&["A(11)=1"]), "SUBSCRIPT OUT OF RANGE\n");
}

#[test]
fn test_dim_and_bounds() {
    let (mut runtime, output) = runtime();
    let out = enter(
        &mut runtime,
        &output,
        &["10 DIM B(2,3)", "20 B(2,3)=7", "30 PRINT B(2,3);B(0,0)", "RUN"],
    );
    assert_eq!(out, " 7  0 \n");
    let out = enter(&mut runtime, &output, &["PRINT B(3,0)"]);
    assert_eq!(out, "SUBSCRIPT OUT OF RANGE\n");
    let out = enter(&mut runtime, &output, &["PRINT B(1)"]);
    assert_eq!(out, "SUBSCRIPT OUT OF RANGE\n");
}

#[test]
fn test_negative_index() {
    assert_eq!(run(&["PRINT A(-1)"]), "SUBSCRIPT OUT OF RANGE\n");
}

#[test]
fn test_dim_negative_size() {
    assert_eq!(run(&["DIM C(-1)"]), "ILLEGAL FUNCTION CALL\n");
}

#[test]
fn test_string_arrays() {
    let out = run(&[r#"A$(1)="HI" : PRINT A$(1);A$(2)"#]);
    assert_eq!(out, "HI\n");
}

#[test]
fn test_redimension_reallocates() {
    let (mut runtime, output) = runtime();
    enter(&mut runtime, &output, &["DIM A(5)", "A(5)=1", "DIM A(2)"]);
    let out = enter(&mut runtime, &output, &["PRINT A(2)"]);
    assert_eq!(out, " 0 \n");
    let out = enter(&mut runtime, &output, &["PRINT A(5)"]);
    assert_eq!(out, "SUBSCRIPT OUT OF RANGE\n");
}

#[test]
fn test_scalar_and_array_coexist() {
    let out = run(&["A=1 : A(0)=2 : PRINT A;A(0)"]);
    assert_eq!(out, " 1  2 \n");
}

#[test]
fn test_multiple_declarations() {
    let out = run(&["DIM A(1,1), B$(2) : A(1,1)=3 : B$(2)=\"X\" : PRINT A(1,1);B$(2)"]);
    assert_eq!(out, " 3 X\n");
}

#[test]
fn test_read_into_element() {
    let out = run(&["10 DATA 5", "20 READ A(3)", "30 PRINT A(3)", "RUN"]);
    assert_eq!(out, " 5 \n");
}

#[test]
fn test_row_major_layout_is_consistent() {
    let out = run(&[
        "10 DIM G(2,2)",
        "20 FOR I=0 TO 2 : FOR J=0 TO 2 : G(I,J)=I*10+J : NEXT J : NEXT I",
        "30 PRINT G(0,1);G(1,0);G(2,2)",
        "RUN",
    ]);
    assert_eq!(out, " 1  10  22 \n");
}
