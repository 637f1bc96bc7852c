use crate::generate;

fn compile(source: &str) -> String {
    let mut program = mcc_par::parse(source).expect("source parses");
    let mut out = Vec::new();
    generate(&mut program, &mut out).expect("source generates");
    String::from_utf8(out).expect("assembly is valid utf8")
}

#[test]
fn emits_a_globl_entry_point() {
    let asm = compile("int main(){ return 42; }");
    assert!(asm.contains(".globl main"));
    assert!(asm.contains("main:"));
    assert!(asm.contains("mov $42, %rax"));
}

#[test]
fn every_function_has_a_matching_return_label() {
    let asm = compile("int one(){ return 1; } int main(){ return one(); }");
    assert!(asm.contains(".L.return.one:"));
    assert!(asm.contains(".L.return.main:"));
}

#[test]
fn labels_are_unique_across_the_whole_output() {
    let asm = compile(
        "int f(){ if (1) return 1; else return 0; } \
         int main(){ if (1) return 1; else return 0; }",
    );
    let mut labels = Vec::new();
    for line in asm.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(".L.else.").or_else(|| line.strip_prefix(".L.end.")) {
            if let Some(n) = rest.strip_suffix(':') {
                labels.push(n.to_string());
            }
        }
    }
    let mut unique = labels.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(labels.len(), unique.len(), "duplicate labels in {labels:?}");
}

#[test]
fn stack_size_is_16_byte_aligned() {
    let mut program = mcc_par::parse("int main(){ char a; int b; return 0; }").unwrap();
    let mut out = Vec::new();
    generate(&mut program, &mut out).unwrap();
    assert_eq!(program.functions[0].stack_size % 16, 0);
}

#[test]
fn local_offsets_are_unique_and_within_the_frame() {
    let mut program = mcc_par::parse("int main(){ int a; int b; int c; return 0; }").unwrap();
    let mut out = Vec::new();
    generate(&mut program, &mut out).unwrap();
    let f = &program.functions[0];
    let mut offsets: Vec<i64> = f.locals.as_slice().iter().map(|o| o.offset).collect();
    offsets.sort();
    offsets.dedup();
    assert_eq!(offsets.len(), f.locals.len());
    for offset in offsets {
        assert!(offset < 0);
        assert!(-offset <= f.stack_size);
    }
}

#[test]
fn globals_are_emitted_in_source_order_before_text() {
    let asm = compile("int a; int b; int main(){ return a+b; }");
    let a_pos = asm.find("a:").unwrap();
    let b_pos = asm.find("b:").unwrap();
    let main_pos = asm.find("main:").unwrap();
    assert!(a_pos < b_pos);
    assert!(b_pos < main_pos);
}

#[test]
fn zero_initialized_global_emits_zero_directive() {
    let asm = compile("int counter; int main(){ return counter; }");
    assert!(asm.contains(".zero 8"));
}

#[test]
fn string_literal_global_emits_byte_directives_with_nul() {
    let asm = compile(r#"int main(){ char *s = "hi"; return 0; }"#);
    assert!(asm.contains(".byte 104"));
    assert!(asm.contains(".byte 105"));
    assert!(asm.contains(".byte 0"));
}

#[test]
fn function_call_arguments_load_in_reverse_register_order() {
    let asm = compile("int add(int a, int b){ return a+b; } int main(){ return add(1,2); }");
    let call_pos = asm.find("call add").unwrap();
    let rsi_pos = asm.rfind("pop %rsi").unwrap();
    let rdi_pos = asm.rfind("pop %rdi").unwrap();
    assert!(rsi_pos < call_pos);
    assert!(rdi_pos < call_pos && rdi_pos > rsi_pos);
}

#[test]
fn pointer_store_and_array_index_assignment_round_trip() {
    let asm = compile("int main(){ int a[3]; int *p=a; *(p+1)=5; a[2]=6; return a[1]+a[2]; }");
    assert!(asm.contains("main:"));
    assert!(asm.contains("mov %rax, (%rdi)"));
}

#[test]
fn char_assignment_stores_a_single_byte() {
    let asm = compile("int main(){ char c; c=65; return c; }");
    assert!(asm.contains("mov %al, (%rdi)"));
    assert!(asm.contains("movsbq (%rax), %rax"));
}
