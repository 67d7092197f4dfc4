//! AUTOARG expansion: header port name lists.

mod common;

use common::assert_expansion;

#[test]
fn fills_an_empty_header_in_every_module() {
    assert_expansion(
        r#"
module t1 (  /*AUTOARG*/);
  input logic clk;
  input logic rst;
  output logic o;
endmodule
module t2 (  /*AUTOARG*/);
  input logic clk;
  input rst;
  output reg o;
endmodule
"#,
        r#"
module t1 (  /*AUTOARG*/
    // Inputs
    clk,
    rst,
    // Outputs
    o
);
  input logic clk;
  input logic rst;
  output logic o;
endmodule
module t2 (  /*AUTOARG*/
    // Inputs
    clk,
    rst,
    // Outputs
    o
);
  input logic clk;
  input rst;
  output reg o;
endmodule
"#,
    );
}

#[test]
fn marker_outside_the_header_is_left_alone() {
    assert_expansion(
        r#"
module t ();
  /*AUTOARG*/
  input logic clk;
  input logic rst;
  output logic o;
endmodule
"#,
        r#"
module t ();
  /*AUTOARG*/
  input logic clk;
  input logic rst;
  output logic o;
endmodule
"#,
    );
}

#[test]
fn replaces_a_stale_generated_list() {
    assert_expansion(
        r#"
module t (  /*AUTOARG*/
    //Inputs
    clk,
    rst
    // some comment
);
  input logic clk;
  input logic rst;
  inout logic io;
  output logic o;
endmodule
"#,
        r#"
module t (  /*AUTOARG*/
    // Inputs
    clk,
    rst,
    // Inouts
    io,
    // Outputs
    o
);
  input logic clk;
  input logic rst;
  inout logic io;
  output logic o;
endmodule
"#,
    );
}

#[test]
fn names_written_by_hand_are_not_re_emitted() {
    assert_expansion(
        r#"
module t (
    input i1,
    i2,
    o1,  /*AUTOARG*/
    //Inputs
    clk,
    rst
);
  input logic clk;
  input logic rst;
  input logic i2;
  output logic o1;
  output logic o2;
endmodule
"#,
        r#"
module t (
    input i1,
    i2,
    o1,  /*AUTOARG*/
    // Inputs
    clk,
    rst,
    // Outputs
    o2
);
  input logic clk;
  input logic rst;
  input logic i2;
  output logic o1;
  output logic o2;
endmodule
"#,
    );
}
