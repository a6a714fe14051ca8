// src/structural.rs

use crate::model::{MethodSummary, StructuralMetrics, SyntaxSummary, Visibility};

/// Class-shape metrics for one file revision.
///
/// Only the primary class contributes to the method and field counts; ELOC
/// always covers the whole file. Coupling, cohesion and inheritance metrics
/// keep the defaults of [`StructuralMetrics`].
pub fn structural_metrics(summary: &SyntaxSummary, source: &str) -> StructuralMetrics {
    let mut metrics = StructuralMetrics {
        eloc: effective_lines(source),
        ..StructuralMetrics::default()
    };

    if let Some(class) = summary.primary_class() {
        metrics.nom = class.methods.len();
        metrics.nopm = class.methods.iter().filter(|m| m.visibility == Visibility::Public).count();
        metrics.nosm = class.methods.iter().filter(|m| m.is_static).count();
        metrics.nof = class.fields.len();
        metrics.nosf = class.fields.iter().filter(|f| f.is_static).count();
        metrics.nopf = class.fields.iter().filter(|f| f.visibility == Visibility::Public).count();
        metrics.wmc = class.methods.iter().filter_map(cyclomatic_complexity).sum();
    }

    metrics
}

/// 1 + direct decision points, for methods whose body has at least one statement
pub fn cyclomatic_complexity(method: &MethodSummary) -> Option<u32> {
    method
        .body
        .filter(|body| body.statements > 0)
        .map(|body| body.decision_points + 1)
}

/// Lines that are not blank after trimming
pub fn effective_lines(source: &str) -> usize {
    source.lines().filter(|line| !line.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassSummary, FieldSummary, MethodBody};

    fn method(visibility: Visibility, is_static: bool, body: Option<(usize, u32)>) -> MethodSummary {
        MethodSummary {
            name: "m".to_string(),
            visibility,
            is_static,
            body: body.map(|(statements, decision_points)| MethodBody {
                statements,
                decision_points,
            }),
        }
    }

    fn field(visibility: Visibility, is_static: bool) -> FieldSummary {
        FieldSummary { visibility, is_static }
    }

    fn summary(class: ClassSummary) -> SyntaxSummary {
        SyntaxSummary { classes: vec![class] }
    }

    #[test]
    fn counts_methods_and_fields_by_modifier() {
        let class = ClassSummary {
            name: "Sample".to_string(),
            methods: vec![
                method(Visibility::Public, false, Some((3, 1))),
                method(Visibility::Private, false, Some((1, 0))),
            ],
            fields: vec![
                field(Visibility::Private, true),
                field(Visibility::Public, false),
                field(Visibility::Public, false),
            ],
        };

        let metrics = structural_metrics(&summary(class), "");
        assert_eq!(metrics.nom, 2);
        assert_eq!(metrics.nopm, 1);
        assert_eq!(metrics.nof, 3);
        assert_eq!(metrics.nosf, 1);
        assert_eq!(metrics.nopf, 2);
        assert_eq!(metrics.nosm, 0);
        assert_eq!(metrics.wmc, 3);
    }

    #[test]
    fn class_without_methods_has_zero_wmc() {
        let class = ClassSummary {
            name: "Empty".to_string(),
            ..ClassSummary::default()
        };
        assert_eq!(structural_metrics(&summary(class), "class Empty {}").wmc, 0);
    }

    #[test]
    fn bodiless_and_empty_methods_are_left_out_of_wmc() {
        let class = ClassSummary {
            name: "Shape".to_string(),
            methods: vec![
                method(Visibility::Public, false, None),
                method(Visibility::Public, false, Some((0, 0))),
                method(Visibility::Public, true, Some((4, 2))),
            ],
            fields: Vec::new(),
        };
        let metrics = structural_metrics(&summary(class), "");
        assert_eq!(metrics.wmc, 3);
        assert_eq!(metrics.nom, 3);
        assert_eq!(metrics.nosm, 1);
    }

    #[test]
    fn eloc_skips_blank_lines() {
        let source = "package a;\n\nclass A {\n  int x;\n   \n  void f() {\n    x++;\n  }\n}\n// end";
        assert_eq!(source.lines().count(), 10);
        assert_eq!(effective_lines(source), 8);
    }

    #[test]
    fn placeholders_keep_their_defaults() {
        let metrics = structural_metrics(&SyntaxSummary::default(), "class A {}\n");
        assert_eq!(metrics.eloc, 1);
        assert_eq!(metrics.nom, 0);
        assert_eq!(metrics.dit, 1);
        assert_eq!((metrics.cbo, metrics.rfc, metrics.noc, metrics.sexp), (0, 0, 0, 0));
        assert_eq!((metrics.hs_lcom, metrics.c3, metrics.com_read, metrics.nosi), (0, 0, 0, 0));
    }
}
