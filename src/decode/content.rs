//! Content stream walking: page text in reading order and image placements.

use lopdf::content::Operation;
use lopdf::Object;

use crate::model::BBox;

/// Baseline shift (in user space units) that starts a new text line.
const LINE_BREAK_THRESHOLD: f32 = 2.0;

/// TJ adjustment (thousandths of text space) treated as a word space.
const SPACE_THRESHOLD: f32 = 200.0;

/// An affine transform `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self` applied first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Bounding box of the unit square under this transform.
    fn unit_square_bbox(&self) -> BBox {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        let xs = corners.iter().map(|p| p.0);
        let ys = corners.iter().map(|p| p.1);
        BBox::new(
            xs.clone().fold(f32::INFINITY, f32::min),
            ys.clone().fold(f32::INFINITY, f32::min),
            xs.fold(f32::NEG_INFINITY, f32::max),
            ys.fold(f32::NEG_INFINITY, f32::max),
        )
    }
}

/// An XObject drawn with `Do`.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Resource name of the XObject
    pub name: Vec<u8>,
    pub bbox: BBox,
}

/// Text and drawn XObjects of a page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    /// Page text, one text line per line
    pub text: String,

    /// (byte offset, baseline y) of each line
    lines: Vec<(usize, f32)>,

    /// XObjects in drawing order
    pub placements: Vec<Placement>,
}

impl PageLayout {
    /// Byte offset of the first line drawn below the middle of `bbox`, or
    /// the end of the text when no line is.
    pub fn anchor_for(&self, bbox: &BBox) -> usize {
        let middle = bbox.center_y();
        self.lines
            .iter()
            .find(|(_, y)| *y < middle)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.text.len())
    }
}

/// Walks content stream operations, tracking graphics and text state.
pub struct LayoutWalker<'a> {
    decode: &'a dyn Fn(&[u8], &[u8]) -> String,
    ctm: Matrix,
    saved: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
    font: Vec<u8>,
    line_y: Option<f32>,
    layout: PageLayout,
}

impl<'a> LayoutWalker<'a> {
    /// `decode` turns string bytes into text given the current font resource name.
    pub fn new(decode: &'a dyn Fn(&[u8], &[u8]) -> String) -> Self {
        Self {
            decode,
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            leading: 0.0,
            font: Vec::new(),
            line_y: None,
            layout: PageLayout::default(),
        }
    }

    pub fn walk(mut self, operations: &[Operation]) -> PageLayout {
        for op in operations {
            self.apply(op);
        }
        self.layout
    }

    fn apply(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.saved.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.saved.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.line_y = None,
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.font = name.clone();
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    self.leading = leading;
                }
            }
            "Td" => self.move_line(operands),
            "TD" => {
                if let Some(ty) = operands.get(1).and_then(number) {
                    self.leading = -ty;
                }
                self.move_line(operands);
            }
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = (self.decode)(&self.font, bytes);
                    self.show(&text);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = (self.decode)(&self.font, bytes);
                    self.show(&text);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    let text = (self.decode)(&self.font, bytes);
                    self.show(&text);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.combine_tj(items);
                    self.show(&text);
                }
            }
            "Do" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.layout.placements.push(Placement {
                        name: name.clone(),
                        bbox: self.ctm.unit_square_bbox(),
                    });
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, operands: &[Object]) {
        let tx = operands.first().and_then(number).unwrap_or(0.0);
        let ty = operands.get(1).and_then(number).unwrap_or(0.0);
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.line_matrix = Matrix::translation(0.0, -self.leading).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn combine_tj(&self, items: &[Object]) -> String {
        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => combined.push_str(&(self.decode)(&self.font, bytes)),
                other => {
                    let adjustment = number(other).map(|n| -n).unwrap_or(0.0);
                    if adjustment > SPACE_THRESHOLD
                        && !combined.is_empty()
                        && !combined.ends_with(' ')
                    {
                        combined.push(' ');
                    }
                }
            }
        }
        combined
    }

    /// Append shown text, starting a new line when the baseline moved.
    fn show(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let (_, y) = self.text_matrix.then(&self.ctm).apply(0.0, 0.0);
        let same_line = self
            .line_y
            .map_or(false, |line_y| (line_y - y).abs() <= LINE_BREAK_THRESHOLD);

        let layout = &mut self.layout;
        if !same_line {
            if !layout.text.is_empty() {
                layout.text.push('\n');
            }
            layout.lines.push((layout.text.len(), y));
            self.line_y = Some(y);
        }
        layout.text.push_str(text);
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let v: Vec<f32> = operands[..6].iter().map(number).collect::<Option<_>>()?;
    Some(Matrix::new(v[0], v[1], v[2], v[3], v[4], v[5]))
}
