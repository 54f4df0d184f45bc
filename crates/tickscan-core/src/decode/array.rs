use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectOpen,
    ExpectFirst,
    ExpectNext,
    InElement(ElementKind),
    AfterElement,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    /// Object or array, ends when nesting depth returns to zero.
    Composite,
    /// String scalar, ends at its closing quote.
    Text,
    /// Number, boolean or null, ends at the next delimiter.
    Literal,
}

/// Incremental splitter for a top-level JSON array.
///
/// Bytes are fed in whatever chunks the transport delivers; every element is
/// returned as soon as its last byte has been seen, so at most one element is
/// buffered at a time. The splitter only tracks structure (brackets, strings
/// and escapes); validating an element's contents is left to whoever decodes
/// the returned bytes.
#[derive(Debug)]
pub struct ArrayElements {
    state: State,
    depth: usize,
    in_string: bool,
    escaped: bool,
    element: Vec<u8>,
    position: usize,
    emitted: usize,
}

impl Default for ArrayElements {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrayElements {
    pub fn new() -> Self {
        Self {
            state: State::ExpectOpen,
            depth: 0,
            in_string: false,
            escaped: false,
            element: Vec::new(),
            position: 0,
            emitted: 0,
        }
    }

    /// Consumes a chunk and returns the raw bytes of every element it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Vec<u8>>, ProviderError> {
        let mut ready = Vec::new();
        for &byte in chunk {
            self.step(byte, &mut ready)?;
            self.position += 1;
        }
        Ok(ready)
    }

    /// Checks that the closing `]` was reached once the body is exhausted.
    pub fn finish(&self) -> Result<(), ProviderError> {
        match self.state {
            State::Done => Ok(()),
            State::ExpectOpen => Err(ProviderError::decode(
                "expected '[' opening the array, payload ended",
            )),
            _ => Err(ProviderError::decode(format!(
                "payload ended before the closing ']' after {} element(s)",
                self.emitted
            ))),
        }
    }

    /// Number of elements returned so far.
    pub const fn emitted(&self) -> usize {
        self.emitted
    }

    fn step(&mut self, byte: u8, ready: &mut Vec<Vec<u8>>) -> Result<(), ProviderError> {
        match self.state {
            State::ExpectOpen => match byte {
                b'[' => self.state = State::ExpectFirst,
                other if !is_whitespace(other) => {
                    return Err(self.unexpected(other, "expected '[' opening the array"));
                }
                _ => {}
            },
            State::ExpectFirst => match byte {
                b']' => self.state = State::Done,
                other if !is_whitespace(other) => self.begin(other)?,
                _ => {}
            },
            State::ExpectNext => {
                if !is_whitespace(byte) {
                    self.begin(byte)?;
                }
            }
            State::InElement(kind) => self.extend(kind, byte, ready)?,
            State::AfterElement => self.after_element(byte)?,
            State::Done => {
                if !is_whitespace(byte) {
                    return Err(self.unexpected(byte, "trailing data after the closing ']'"));
                }
            }
        }
        Ok(())
    }

    fn begin(&mut self, byte: u8) -> Result<(), ProviderError> {
        let kind = match byte {
            b'{' | b'[' => {
                self.depth = 1;
                ElementKind::Composite
            }
            b'"' => {
                self.in_string = true;
                ElementKind::Text
            }
            b']' | b'}' | b',' | b':' => {
                return Err(self.unexpected(byte, "expected an array element"));
            }
            _ => ElementKind::Literal,
        };

        self.element.clear();
        self.element.push(byte);
        self.state = State::InElement(kind);
        Ok(())
    }

    fn extend(
        &mut self,
        kind: ElementKind,
        byte: u8,
        ready: &mut Vec<Vec<u8>>,
    ) -> Result<(), ProviderError> {
        match kind {
            ElementKind::Composite => {
                self.element.push(byte);
                if self.in_string {
                    self.scan_string(byte);
                    return Ok(());
                }
                match byte {
                    b'"' => self.in_string = true,
                    b'{' | b'[' => self.depth += 1,
                    b'}' | b']' => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            self.emit(ready);
                        }
                    }
                    _ => {}
                }
            }
            ElementKind::Text => {
                self.element.push(byte);
                self.scan_string(byte);
                if !self.in_string {
                    self.emit(ready);
                }
            }
            ElementKind::Literal => {
                if is_whitespace(byte) || byte == b',' || byte == b']' {
                    self.emit(ready);
                    return self.after_element(byte);
                }
                self.element.push(byte);
            }
        }
        Ok(())
    }

    fn scan_string(&mut self, byte: u8) {
        if self.escaped {
            self.escaped = false;
        } else if byte == b'\\' {
            self.escaped = true;
        } else if byte == b'"' {
            self.in_string = false;
        }
    }

    fn emit(&mut self, ready: &mut Vec<Vec<u8>>) {
        ready.push(std::mem::take(&mut self.element));
        self.emitted += 1;
        self.state = State::AfterElement;
    }

    fn after_element(&mut self, byte: u8) -> Result<(), ProviderError> {
        match byte {
            b',' => self.state = State::ExpectNext,
            b']' => self.state = State::Done,
            other if !is_whitespace(other) => {
                return Err(self.unexpected(other, "expected ',' or ']' after an element"));
            }
            _ => {}
        }
        Ok(())
    }

    fn unexpected(&self, byte: u8, expectation: &str) -> ProviderError {
        ProviderError::decode(format!(
            "{expectation}, found {:?} at byte {}",
            char::from(byte),
            self.position
        ))
    }
}

const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}
