//! Wavefront OBJ parser producing welded, indexed mesh models.
//!
//! Supported elements are `o`, `v`, `vt`, `vn` and triangular `f`. Lines with
//! other elements, and faces that are not triangles, are skipped with a
//! [`ParseWarning`]. Malformed numbers abort the file with an [`ObjError`].
use std::fmt;
use std::path::Path;
use std::str::SplitWhitespace;

use log::{debug, warn};
use nom::{
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt, recognize},
    number::complete::float,
    sequence::{pair, preceded, tuple},
    IResult,
};

use crate::error::{ObjError, ObjResult};
use crate::geometry::{MeshModel, Vec2, Vec3};
use crate::weld::{AttributePools, FaceVertex, VertexWelder};

/// A recoverable problem on one line; the line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A face with a vertex count other than three.
    NonTriangularFace { vertices: usize },
    /// A line starting with an element this parser does not handle.
    UnknownToken { token: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[.obj parse] {}:{}: ", self.file, self.line)?;
        match &self.kind {
            WarningKind::NonTriangularFace { vertices } => {
                write!(f, "can't load non-triangular faces ({} vertices)", vertices)
            }
            WarningKind::UnknownToken { token } => write!(f, "unknown element token '{}'", token),
        }
    }
}

/// Everything parsed from one OBJ file.
#[derive(Debug, Clone, Default)]
pub struct ObjDocument {
    pub models: Vec<MeshModel>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse OBJ text. `file` labels warnings and errors.
pub fn parse_obj(file: &str, input: &str) -> ObjResult<ObjDocument> {
    let mut parser = ObjParser::new(file);
    for (i, line) in input.lines().enumerate() {
        parser.parse_line(i + 1, line)?;
    }
    Ok(parser.finish())
}

/// Read and parse an OBJ file from disk, labelled by its path.
pub fn load_obj_file(path: &Path) -> ObjResult<ObjDocument> {
    let input = std::fs::read_to_string(path).map_err(|e| ObjError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_obj(&path.display().to_string(), &input)
}

/// Faces collected for the model currently being parsed.
struct ModelBuilder {
    name: String,
    welder: VertexWelder,
    indices: Vec<u32>,
}

impl ModelBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            welder: VertexWelder::new(),
            indices: Vec::new(),
        }
    }

    fn finish(self) -> MeshModel {
        self.welder.finish(self.name, self.indices)
    }
}

struct ObjParser<'a> {
    file: &'a str,
    pools: AttributePools,
    current: ModelBuilder,
    models: Vec<MeshModel>,
    warnings: Vec<ParseWarning>,
}

impl<'a> ObjParser<'a> {
    fn new(file: &'a str) -> Self {
        Self {
            file,
            pools: AttributePools::new(),
            current: ModelBuilder::new(String::new()),
            models: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn parse_line(&mut self, line: usize, text: &str) -> ObjResult<()> {
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(());
        }

        let mut tokens = text.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(());
        };

        match keyword {
            "o" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                self.begin_model(name);
            }
            "v" => {
                let [x, y, z] = self.parse_coordinates::<3>("v", line, tokens)?;
                self.pools.positions.push(Vec3::new(x, y, z));
            }
            "vn" => {
                let [x, y, z] = self.parse_coordinates::<3>("vn", line, tokens)?;
                self.pools.normals.push(Vec3::new(x, y, z));
            }
            "vt" => {
                let [u, v] = self.parse_coordinates::<2>("vt", line, tokens)?;
                self.pools.tex_coords.push(Vec2::new(u, v));
            }
            "f" => self.parse_face(line, tokens)?,
            other => self.warn(
                line,
                WarningKind::UnknownToken {
                    token: other.to_string(),
                },
            ),
        }
        Ok(())
    }

    fn begin_model(&mut self, name: String) {
        let previous = std::mem::replace(&mut self.current, ModelBuilder::new(name));
        // Unnamed models are dropped here, faces included; only the model in
        // progress at end of input is always kept.
        if !previous.name.is_empty() {
            self.push_model(previous);
        }
    }

    fn push_model(&mut self, builder: ModelBuilder) {
        let model = builder.finish();
        debug!(
            "[.obj parse] {}: model '{}' has {} vertices, {} triangles",
            self.file,
            model.name,
            model.vertex_count(),
            model.triangle_count()
        );
        self.models.push(model);
    }

    fn parse_coordinates<const N: usize>(
        &self,
        element: &'static str,
        line: usize,
        tokens: SplitWhitespace<'_>,
    ) -> ObjResult<[f32; N]> {
        let mut values = [0.0; N];
        let mut found = 0;
        // Components beyond N (w, vertex colours) are ignored.
        for (slot, token) in values.iter_mut().zip(tokens) {
            *slot = match coordinate(token) {
                Ok((_, value)) => value,
                Err(_) => {
                    return Err(ObjError::InvalidNumber {
                        file: self.file.to_string(),
                        line,
                        element,
                        literal: token.to_string(),
                    })
                }
            };
            found += 1;
        }
        if found < N {
            return Err(ObjError::MissingComponents {
                file: self.file.to_string(),
                line,
                element,
                expected: N,
                found,
            });
        }
        Ok(values)
    }

    fn parse_face(&mut self, line: usize, tokens: SplitWhitespace<'_>) -> ObjResult<()> {
        let corners: Vec<&str> = tokens.collect();
        if corners.len() != 3 {
            self.warn(
                line,
                WarningKind::NonTriangularFace {
                    vertices: corners.len(),
                },
            );
            return Ok(());
        }

        let mut resolved = Vec::with_capacity(3);
        for token in &corners {
            resolved.push(self.resolve_face_vertex(line, token)?);
        }

        for vertex in resolved {
            let index = self
                .current
                .welder
                .weld(vertex, &self.pools)
                .map_err(|source| ObjError::Weld {
                    file: self.file.to_string(),
                    line,
                    source,
                })?;
            self.current.indices.push(index);
        }
        Ok(())
    }

    /// Turn `p[/t][/n]` into 0-based pool indices. Negative values count back
    /// from the most recently declared element.
    fn resolve_face_vertex(&self, line: usize, token: &str) -> ObjResult<FaceVertex> {
        let invalid = || ObjError::InvalidFaceVertex {
            file: self.file.to_string(),
            line,
            token: token.to_string(),
        };

        let (_, (position, tex_coord, normal)) = face_vertex(token).map_err(|_| invalid())?;

        let position =
            resolve_index(position, self.pools.positions.len()).ok_or_else(invalid)?;
        let tex_coord = match tex_coord {
            Some(raw) => Some(resolve_index(raw, self.pools.tex_coords.len()).ok_or_else(invalid)?),
            None => None,
        };
        let normal = match normal {
            Some(raw) => Some(resolve_index(raw, self.pools.normals.len()).ok_or_else(invalid)?),
            None => None,
        };
        Ok(FaceVertex::new(position, tex_coord, normal))
    }

    fn warn(&mut self, line: usize, kind: WarningKind) {
        let warning = ParseWarning {
            file: self.file.to_string(),
            line,
            kind,
        };
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn finish(mut self) -> ObjDocument {
        let last = std::mem::replace(&mut self.current, ModelBuilder::new(String::new()));
        self.push_model(last);
        ObjDocument {
            models: self.models,
            warnings: self.warnings,
        }
    }
}

/// Map a 1-based (or negative, relative) OBJ index onto a 0-based one.
fn resolve_index(raw: i64, pool_len: usize) -> Option<usize> {
    if raw > 0 {
        usize::try_from(raw - 1).ok()
    } else if raw < 0 {
        let back = usize::try_from(raw.unsigned_abs()).ok()?;
        pool_len.checked_sub(back)
    } else {
        None
    }
}

fn coordinate(input: &str) -> IResult<&str, f32> {
    all_consuming(float)(input)
}

fn obj_index(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

fn face_vertex(input: &str) -> IResult<&str, (i64, Option<i64>, Option<i64>)> {
    let (rest, (position, tex_coord, normal)) = all_consuming(tuple((
        obj_index,
        opt(preceded(char('/'), opt(obj_index))),
        opt(preceded(char('/'), opt(obj_index))),
    )))(input)?;
    Ok((rest, (position, tex_coord.flatten(), normal.flatten())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeldError;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    #[test]
    fn test_single_unnamed_triangle() {
        let doc = parse_obj("tri.obj", TRIANGLE).unwrap();
        assert_eq!(doc.models.len(), 1);
        assert!(doc.warnings.is_empty());

        let model = &doc.models[0];
        assert_eq!(model.name, "");
        assert_eq!(model.positions.len(), 3);
        assert_eq!(model.indices, vec![0, 1, 2]);
        assert!(model.tex_coords.iter().all(|t| *t == Vec2::new(0.0, 0.0)));
        assert!(model.normals.iter().all(|n| *n == Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_quad_face_is_warned_and_skipped() {
        let doc = parse_obj("quad.obj", "f 1 2 3 4\n").unwrap();
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(
            doc.warnings[0],
            ParseWarning {
                file: "quad.obj".to_string(),
                line: 1,
                kind: WarningKind::NonTriangularFace { vertices: 4 },
            }
        );
        assert!(doc.models.iter().all(|m| m.indices.is_empty()));
    }

    #[test]
    fn test_non_triangular_faces_leave_indices_untouched() {
        let input = format!("{}f 1 2\nf 1 2 3 1\nf 3 2 1\n", TRIANGLE);
        let doc = parse_obj("mixed.obj", &input).unwrap();
        assert_eq!(doc.warnings.len(), 2);
        assert_eq!(doc.warnings[0].line, 5);
        assert_eq!(doc.warnings[1].line, 6);
        assert_eq!(doc.models[0].indices, vec![0, 1, 2, 2, 1, 0]);
    }

    #[test]
    fn test_unknown_token_is_warned() {
        let input = "# comment\n\nmtllib scene.mtl\nv 0 0 0\n";
        let doc = parse_obj("scene.obj", input).unwrap();
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].line, 3);
        assert_eq!(
            doc.warnings[0].kind,
            WarningKind::UnknownToken {
                token: "mtllib".to_string()
            }
        );
        assert_eq!(
            doc.warnings[0].to_string(),
            "[.obj parse] scene.obj:3: unknown element token 'mtllib'"
        );
    }

    #[test]
    fn test_shared_triples_are_welded() {
        let input = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
f 1/1/1 3/1/1 4/1/1
";
        let doc = parse_obj("quad.obj", input).unwrap();
        let model = &doc.models[0];
        assert_eq!(model.positions.len(), 4);
        assert_eq!(model.tex_coords.len(), 4);
        assert_eq!(model.normals.len(), 4);
        assert_eq!(model.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(model.normals[3], Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_same_position_with_different_normals_is_split() {
        let input = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vn 0 0 -1
f 1//1 2//1 3//1
f 1//2 3//2 2//2
";
        let doc = parse_obj("sided.obj", input).unwrap();
        let model = &doc.models[0];
        assert_eq!(model.positions.len(), 6);
        assert_eq!(model.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(model.positions[3], model.positions[0]);
    }

    #[test]
    fn test_missing_optional_attributes() {
        let input = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
vn 1 0 0
f 1 2// 3/1
f 1//1 2/1/ 3/1/1
";
        let doc = parse_obj("partial.obj", input).unwrap();
        let model = &doc.models[0];
        assert_eq!(model.indices, vec![0, 1, 2, 3, 4, 5]);
        // `1` and `2//` have neither attribute
        assert_eq!(model.tex_coords[0], Vec2::new(0.0, 0.0));
        assert_eq!(model.normals[1], Vec3::new(0.0, 1.0, 0.0));
        // `3/1` has a texcoord but no normal
        assert_eq!(model.tex_coords[2], Vec2::new(0.5, 0.5));
        assert_eq!(model.normals[2], Vec3::new(0.0, 1.0, 0.0));
        // `1//1` has a normal but no texcoord
        assert_eq!(model.tex_coords[3], Vec2::new(0.0, 0.0));
        assert_eq!(model.normals[3], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_models_have_isolated_index_spaces() {
        let input = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
o A
f 1 2 3
o B
f 4 3 2
f 2 3 4
";
        let doc = parse_obj("pair.obj", input).unwrap();
        assert_eq!(doc.models.len(), 2);

        let a = &doc.models[0];
        let b = &doc.models[1];
        assert_eq!(a.name, "A");
        assert_eq!(a.indices, vec![0, 1, 2]);
        assert_eq!(b.name, "B");
        assert_eq!(b.indices, vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(b.positions[0], Vec3::new(1.0, 1.0, 0.0));
        for model in &doc.models {
            assert!(model.validate().is_ok());
        }
    }

    #[test]
    fn test_first_face_need_not_use_first_vertex() {
        // B reuses a vertex welded earlier in B, never one from A
        let input = "\
v 0 0 0
v 1 0 0
v 0 1 0
o A
f 1 2 3
o B
f 3 2 1
f 1 2 3
";
        let doc = parse_obj("reuse.obj", input).unwrap();
        assert_eq!(doc.models[1].indices, vec![0, 1, 2, 2, 1, 0]);
    }

    #[test]
    fn test_object_names_join_tokens() {
        let doc = parse_obj("names.obj", "o  Ornate   Barrel \n").unwrap();
        assert_eq!(doc.models.len(), 1);
        assert_eq!(doc.models[0].name, "Ornate Barrel");
    }

    #[test]
    fn test_empty_leading_model_is_dropped() {
        let input = format!("o Named\n{}", TRIANGLE);
        let doc = parse_obj("named.obj", &input).unwrap();
        assert_eq!(doc.models.len(), 1);
        assert_eq!(doc.models[0].name, "Named");
    }

    #[test]
    fn test_faces_before_first_object_are_dropped() {
        let input = format!("{}o Second\nf 3 2 1\n", TRIANGLE);
        let doc = parse_obj("lead.obj", &input).unwrap();
        let names: Vec<&str> = doc.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Second"]);
        assert_eq!(doc.models[0].indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_bare_object_line_drops_its_faces() {
        let input = "\
v 0 0 0
v 1 0 0
v 0 1 0
o A
f 1 2 3
o
f 3 2 1
f 1 3 2
o C
f 2 3 1
";
        let doc = parse_obj("bare.obj", input).unwrap();
        let names: Vec<&str> = doc.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(doc.models[1].triangle_count(), 1);
    }

    #[test]
    fn test_trailing_bare_object_is_kept() {
        let input = format!("o A\n{}o\nf 3 2 1\n", TRIANGLE);
        let doc = parse_obj("tail.obj", &input).unwrap();
        let names: Vec<&str> = doc.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", ""]);
        assert_eq!(doc.models[1].indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_input_yields_one_empty_model() {
        let doc = parse_obj("empty.obj", "").unwrap();
        assert_eq!(doc.models.len(), 1);
        assert!(doc.models[0].is_empty());
    }

    #[test]
    fn test_negative_indices_are_relative() {
        let input = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let doc = parse_obj("rel.obj", input).unwrap();
        assert_eq!(doc.models[0].indices, vec![0, 1, 2]);
        assert_eq!(doc.models[0].positions[1], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_extra_components_are_ignored() {
        let input = "v 1 2 3 1.0 0.5 0.25\nvt 0.5 0.25 0\nf 1/1 1/1 1/1\n";
        let doc = parse_obj("extra.obj", input).unwrap();
        let model = &doc.models[0];
        assert_eq!(model.positions, vec![Vec3::new(1.0, 2.0, 3.0)]);
        assert_eq!(model.tex_coords, vec![Vec2::new(0.5, 0.25)]);
    }

    #[test]
    fn test_windows_line_endings() {
        let doc = parse_obj("crlf.obj", "v 0 0 0\r\nv 1 0 0\r\nv 0 1 0\r\nf 1 2 3\r\n").unwrap();
        assert_eq!(doc.models[0].indices, vec![0, 1, 2]);
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_invalid_number_is_fatal() {
        let err = parse_obj("bad.obj", "v 0 zero 0\n").unwrap_err();
        match err {
            ObjError::InvalidNumber {
                file,
                line,
                element,
                literal,
            } => {
                assert_eq!(file, "bad.obj");
                assert_eq!(line, 1);
                assert_eq!(element, "v");
                assert_eq!(literal, "zero");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_components_are_fatal() {
        let err = parse_obj("short.obj", "v 0 0 0\nvn 0 1\n").unwrap_err();
        assert!(matches!(
            err,
            ObjError::MissingComponents {
                line: 2,
                element: "vn",
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_face_vertex_is_fatal() {
        for token in ["a", "1/x", "0", "1/2/3/4", "-4"] {
            let input = format!("{}f 1 2 {}\n", TRIANGLE, token);
            let err = parse_obj("face.obj", &input).unwrap_err();
            assert!(
                matches!(err, ObjError::InvalidFaceVertex { line: 5, .. }),
                "token {} gave {:?}",
                token,
                err
            );
        }
    }

    #[test]
    fn test_out_of_range_face_index_is_fatal() {
        let input = format!("{}f 1 2 9\n", TRIANGLE);
        let err = parse_obj("range.obj", &input).unwrap_err();
        assert!(matches!(
            err,
            ObjError::Weld {
                line: 5,
                source: WeldError::OutOfRange { index: 8, .. },
                ..
            }
        ));
        assert!(err.to_string().contains("position index 8"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_obj_file(Path::new("/nonexistent/model.obj")).unwrap_err();
        assert!(matches!(err, ObjError::Io { .. }));
    }
}
